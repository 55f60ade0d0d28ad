use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use oracle_relay::app_state::{AppState, PromptSettings};
use oracle_relay::config::AppConfig;
use oracle_relay::routes;
use oracle_relay::services::{
    openai::OpenAiClient,
    store::{spawn_sweeper, JobStore},
};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing oracle-relay server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    metrics::describe_counter!(
        "generation_jobs_total",
        "Total image generation jobs submitted"
    );
    metrics::describe_counter!(
        "generation_jobs_completed",
        "Total image generation jobs completed"
    );
    metrics::describe_counter!(
        "generation_jobs_failed",
        "Total image generation jobs that failed or timed out"
    );
    metrics::describe_histogram!(
        "upstream_request_seconds",
        "Time spent waiting on the image generation API"
    );
    metrics::describe_gauge!(
        "generation_jobs_tracked",
        "Number of jobs currently held in memory"
    );

    let image_size = config
        .image_size
        .parse()
        .expect("IMAGE_SIZE must be one of 256x256, 512x512, 1024x1024, 1792x1024, 1024x1792");

    // Initialize OpenAI client
    tracing::info!(
        chat_model = %config.chat_model,
        image_model = %config.image_model,
        "Initializing OpenAI client"
    );
    let upstream = OpenAiClient::new(
        &config.openai_base_url,
        &config.openai_api_key,
        &config.chat_model,
        &config.image_model,
        Duration::from_secs(config.upstream_timeout_secs),
    )
    .expect("Failed to initialize OpenAI client");

    // Job store and retention sweeper
    let jobs = Arc::new(JobStore::new(config.max_jobs));
    spawn_sweeper(
        Arc::clone(&jobs),
        config.job_retention(),
        config.sweep_interval(),
    );

    let prompts = PromptSettings {
        system_role: config.system_role.clone(),
        default_prompt: config.default_prompt.clone(),
        image_size,
    };

    let state = AppState::new(jobs, Arc::new(upstream), prompts, config.job_deadline());

    let app = routes::build_router(state, Some(prometheus_handle));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}

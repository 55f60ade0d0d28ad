//! Round-trip latency measurement for the chat endpoint.

use std::fmt;
use std::time::{Duration, Instant};

use crate::models::generation::MessageResponse;

/// One timed request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub elapsed: Duration,
    pub chars: usize,
}

impl Sample {
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }

    /// Milliseconds per character of the reply; `None` for an empty reply.
    pub fn ms_per_char(&self) -> Option<f64> {
        (self.chars > 0).then(|| self.elapsed_ms() / self.chars as f64)
    }

    /// Log line for the `index`-th request (1-based).
    pub fn log_line(&self, index: usize) -> String {
        let speed = match self.ms_per_char() {
            Some(speed) => format!("{:.2} ms/char", speed),
            None => "n/a ms/char".to_string(),
        };
        format!(
            "Request {}: {} ms | length: {} chars | {}",
            index,
            self.elapsed.as_millis(),
            self.chars,
            speed
        )
    }
}

/// Averages over a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub rounds: usize,
    pub avg_ms: f64,
    pub avg_ms_per_char: Option<f64>,
}

impl Summary {
    pub fn from_samples(samples: &[Sample]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let avg_ms = samples.iter().map(Sample::elapsed_ms).sum::<f64>() / samples.len() as f64;
        let speeds: Vec<f64> = samples.iter().filter_map(Sample::ms_per_char).collect();
        let avg_ms_per_char =
            (!speeds.is_empty()).then(|| speeds.iter().sum::<f64>() / speeds.len() as f64);

        Some(Self {
            rounds: samples.len(),
            avg_ms,
            avg_ms_per_char,
        })
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "=== Summary over {} runs ===", self.rounds)?;
        writeln!(f, "Average response time: {:.2} ms", self.avg_ms)?;
        match self.avg_ms_per_char {
            Some(speed) => writeln!(f, "Average speed per char: {:.2} ms/char", speed),
            None => writeln!(f, "Average speed per char: n/a"),
        }
    }
}

/// Send one GET to `url` and time it through JSON decoding.
pub async fn measure_once(client: &reqwest::Client, url: &str) -> Result<Sample, BenchError> {
    let start = Instant::now();

    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(BenchError::Status(status));
    }
    let body: MessageResponse = response.json().await?;

    Ok(Sample {
        elapsed: start.elapsed(),
        chars: body.message.chars().count(),
    })
}

#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Endpoint returned {0}")]
    Status(reqwest::StatusCode),

    #[error("Log write failed: {0}")]
    Io(#[from] std::io::Error),
}

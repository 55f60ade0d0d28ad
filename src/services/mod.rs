pub mod openai;
pub mod runner;
pub mod store;
pub mod upstream;

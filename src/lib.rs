pub mod config;
pub mod core;
pub mod engine;
pub mod hal;
pub mod notify;
pub mod observability;
pub mod resilience;

pub use config::PipelineConfig;

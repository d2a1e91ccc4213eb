pub mod metrics;
pub mod monitor;

pub use metrics::PipelineMetrics;
pub use monitor::PipelineMonitor;

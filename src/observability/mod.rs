// Observability: run metrics

pub mod metrics;

pub use metrics::init_prometheus;

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod observability;
pub mod pipeline;

// Layered boundaries for application and infrastructure
pub mod app;
pub mod infra;

// Domain data shapes shared across layers
pub mod domain;

// Library exports for testing
pub mod api;
pub mod browse;
pub mod commands;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod progress;
pub mod range;
pub mod renderer;
pub mod series;
pub mod source;
pub mod timefmt;

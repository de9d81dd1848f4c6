// Domain layer - pure models and statistics
pub mod stats;
pub mod telemetry;
pub mod usage;

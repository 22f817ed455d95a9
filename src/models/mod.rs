// Domain models: snapshot, resource pairs, platform classification, wire payload

mod payload;
mod platform;
mod stats;

pub use payload::StatsPayload;
pub use platform::Platform;
pub use stats::{ResourceUsage, SystemStats, round2};

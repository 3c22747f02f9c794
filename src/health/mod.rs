//! Health sampling: host probes, snapshots, status derivation

pub mod probe;
pub mod sampler;
pub mod types;

pub use probe::{HostProbe, SysinfoProbe};
pub use sampler::HealthSampler;
pub use types::{HealthSnapshot, HealthState};

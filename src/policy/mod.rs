pub mod autoscaler;
pub mod error;
pub mod fingerprint;
pub mod gate;
pub mod reconciliation;

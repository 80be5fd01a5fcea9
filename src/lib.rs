//! Keeps a HorizontalPodAutoscaler in sync with every synthetic ActiveGate StatefulSet.
//!
//! The autoscaler is derived from the StatefulSet alone and stamped with a content hash,
//! so reconciliations only write when the derived spec actually changed.

pub mod core;
pub mod model;
pub mod policy;
pub mod service;

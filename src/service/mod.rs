#[cfg(test)]
pub mod memory_store;
pub mod reconciler_svc;
pub mod store_svc;

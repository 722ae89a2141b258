//! Client refresh pipeline - keep both light clients of a path from expiring.
//!
//! Layers, bottom up:
//! 1. **invoker**: one client update with bounded fixed-delay retry
//! 2. **coordinator**: both clients updated concurrently, first failure wins
//! 3. **interval**: next sleep derived from the two expiries and a threshold
//! 4. **service**: one full cycle on demand (RefreshService)
//! 5. **scheduler**: the cycle repeated forever (RefreshScheduler)

pub mod coordinator;
pub mod interval;
pub mod invoker;
pub mod scheduler;
pub mod service;

pub use coordinator::update_clients;
pub use interval::compute_sleep;
pub use invoker::{update_with_retry, RetryPolicy};
pub use scheduler::{LoopState, RefreshScheduler, SchedulerConfig};
pub use service::{CycleReport, RefreshService};

//! Parallel work dispatch
//!
//! This module owns the threading side of a run and knows nothing about
//! tools or reports:
//!
//! - [`AtomicCounter`] hands out work-item indices, each exactly once.
//! - [`WorkDispatcher`] runs a fixed pool of OS threads that pull indices
//!   until the counter is exhausted, isolating every item's failure.
//! - [`calculate_optimal_workers`] sizes the pool from the CPU count and the
//!   user's limits.
//!
//! ```text
//!            ┌──────────────┐
//!            │ AtomicCounter│  next() -> 0, 1, 2, ... then None
//!            └──────┬───────┘
//!      ┌────────────┼────────────┐
//!  worker-0     worker-1     worker-N    loop: claim index, process, record outcome
//!      └────────────┼────────────┘
//!             DispatchSummary           outcomes sorted by index
//! ```

pub mod counter;
pub mod dispatcher;

pub use counter::AtomicCounter;
pub use dispatcher::{DispatchSummary, EmptyWorkList, TaskFailure, TaskOutcome, WorkDispatcher};

/// Maximum workers allowed by the machine and the user's limits.
///
/// `thread_percentage` of the available cores, at least 1, capped by
/// `max_threads_config` when that is non-zero.
pub fn calculate_optimal_workers(max_threads_config: usize, thread_percentage: u8) -> usize {
    let available_cores = num_cpus::get();

    let workers_by_percentage =
        std::cmp::max(1, (available_cores * thread_percentage as usize) / 100);

    if max_threads_config > 0 {
        std::cmp::min(max_threads_config, workers_by_percentage)
    } else {
        workers_by_percentage
    }
}

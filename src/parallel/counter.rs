use std::sync::{Mutex, PoisonError};

#[derive(Debug)]
struct CounterState {
    current: usize,
    end: usize,
}

/// Lock-guarded index dispenser over `0..end`.
///
/// Every index is handed out exactly once, in increasing order. Once the
/// range is exhausted [`AtomicCounter::next`] keeps returning `None` without
/// touching the state.
#[derive(Debug)]
pub struct AtomicCounter {
    state: Mutex<CounterState>,
}

impl AtomicCounter {
    /// Counter over `0..end`; `end <= 0` means there is no work.
    pub fn new(end: i64) -> Self {
        let end = usize::try_from(end).unwrap_or(0);
        Self {
            state: Mutex::new(CounterState { current: 0, end }),
        }
    }

    pub fn end(&self) -> usize {
        self.lock().end
    }

    /// Claim the next index, or `None` once all indices are taken.
    pub fn next(&self) -> Option<usize> {
        let mut state = self.lock();
        if state.current < state.end {
            let index = state.current;
            state.current += 1;
            Some(index)
        } else {
            None
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CounterState> {
        // No panic point inside the critical section
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

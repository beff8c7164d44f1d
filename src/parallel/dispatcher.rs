use anyhow::{Result, anyhow};
use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use super::AtomicCounter;

/// The resolved work list was empty; nothing was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyWorkList;

impl EmptyWorkList {
    /// Process exit code reported for an empty work list.
    pub const EXIT_CODE: i32 = -2;
}

impl fmt::Display for EmptyWorkList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("No files to process")
    }
}

impl std::error::Error for EmptyWorkList {}

/// Why one work item failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    /// Name of the thread that ran the item
    pub task: String,
    pub file: String,
    pub message: String,
    /// Full cause chain
    pub trace: String,
}

impl TaskFailure {
    fn from_error(file: &str, error: &anyhow::Error) -> Self {
        Self {
            task: current_thread_name(),
            file: file.to_string(),
            message: error.to_string(),
            trace: format!("{error:?}"),
        }
    }

    fn from_panic(file: &str, payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Self {
            task: current_thread_name(),
            file: file.to_string(),
            trace: format!("panicked: {message}"),
            message,
        }
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error in thread '{}', file '{}': {}",
            self.task, self.file, self.message
        )
    }
}

/// Result of one claimed work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    pub index: usize,
    pub file: String,
    pub result: Result<(), TaskFailure>,
}

/// Outcomes of a whole dispatch, in work-list order.
#[derive(Debug, Clone, Default)]
pub struct DispatchSummary {
    pub total: usize,
    pub workers: usize,
    pub outcomes: Vec<TaskOutcome>,
}

impl DispatchSummary {
    pub fn failures(&self) -> impl Iterator<Item = &TaskFailure> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().err())
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Fixed-size pool of worker threads sharing one [`AtomicCounter`].
pub struct WorkDispatcher {
    max_workers: usize,
}

impl WorkDispatcher {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    /// Threads used for `work_count` items: never more than there are items.
    pub fn worker_count(&self, work_count: usize) -> usize {
        std::cmp::min(self.max_workers, work_count.max(1))
    }

    /// Process every file exactly once.
    ///
    /// `process` receives the index and the file. Its errors and panics are
    /// recorded per item and never reach other items or workers. Fails only
    /// when `files` is empty, before any thread starts.
    pub fn dispatch<F>(&self, files: &[String], process: F) -> Result<DispatchSummary>
    where
        F: Fn(usize, &str) -> Result<()> + Sync,
    {
        if files.is_empty() {
            return Err(EmptyWorkList.into());
        }

        let workers = self.worker_count(files.len());
        let counter = AtomicCounter::new(files.len() as i64);
        tracing::debug!("Dispatching {} files to {} workers", counter.end(), workers);

        let mut outcomes = crossbeam::thread::scope(|s| {
            let counter = &counter;
            let process = &process;

            let mut handles = Vec::with_capacity(workers);
            for worker_id in 0..workers {
                let spawned = s
                    .builder()
                    .name(format!("srcfix-worker-{worker_id}"))
                    .spawn(move |_| worker_loop(counter, files, process));

                match spawned {
                    Ok(handle) => handles.push((worker_id, handle)),
                    Err(e) => tracing::warn!("Worker {} could not be started: {}", worker_id, e),
                }
            }

            let mut outcomes = Vec::with_capacity(files.len());
            if handles.is_empty() {
                tracing::warn!("No worker thread started, processing on the current thread");
                outcomes.extend(worker_loop(counter, files, process));
            }

            for (worker_id, handle) in handles {
                match handle.join() {
                    Ok(worker_outcomes) => outcomes.extend(worker_outcomes),
                    Err(_) => tracing::error!("Worker {} terminated abnormally", worker_id),
                }
            }
            outcomes
        })
        .map_err(|_| anyhow!("Thread panic occurred during dispatch"))?;

        outcomes.sort_by_key(|outcome| outcome.index);

        Ok(DispatchSummary {
            total: files.len(),
            workers,
            outcomes,
        })
    }
}

fn worker_loop<F>(counter: &AtomicCounter, files: &[String], process: &F) -> Vec<TaskOutcome>
where
    F: Fn(usize, &str) -> Result<()>,
{
    let mut outcomes = Vec::new();

    while let Some(index) = counter.next() {
        let file = &files[index];
        tracing::trace!("{} claimed #{} {}", current_thread_name(), index, file);

        let result = match catch_unwind(AssertUnwindSafe(|| process(index, file))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(error)) => Err(TaskFailure::from_error(file, &error)),
            Err(payload) => Err(TaskFailure::from_panic(file, payload)),
        };

        if let Err(failure) = &result {
            tracing::error!(
                thread = %failure.task,
                file = %failure.file,
                "{}\n{}",
                failure.message,
                failure.trace
            );
        }

        outcomes.push(TaskOutcome {
            index,
            file: file.clone(),
            result,
        });
    }

    outcomes
}

fn current_thread_name() -> String {
    std::thread::current()
        .name()
        .unwrap_or("main")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn work_list(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("file{i}.h")).collect()
    }

    #[test]
    fn test_empty_work_list_is_rejected() {
        let dispatcher = WorkDispatcher::new(4);
        let called = Mutex::new(false);
        let err = dispatcher
            .dispatch(&[], |_, _| {
                *called.lock().unwrap() = true;
                Ok(())
            })
            .unwrap_err();

        assert!(err.downcast_ref::<EmptyWorkList>().is_some());
        assert!(!*called.lock().unwrap());
    }

    #[test]
    fn test_every_index_processed_once() {
        for (count, max_workers) in [(1, 1), (5, 2), (37, 8), (3, 16)] {
            let files = work_list(count);
            let seen = Mutex::new(Vec::new());

            let summary = WorkDispatcher::new(max_workers)
                .dispatch(&files, |index, file| {
                    assert_eq!(file, format!("file{index}.h"));
                    seen.lock().unwrap().push(index);
                    Ok(())
                })
                .unwrap();

            let mut seen = seen.into_inner().unwrap();
            seen.sort_unstable();
            assert_eq!(seen, (0..count).collect::<Vec<_>>());
            assert_eq!(summary.total, count);
            assert_eq!(summary.succeeded(), count);
            assert!(summary.workers <= count);
            assert!(summary.is_success());
        }
    }

    #[test]
    fn test_failures_are_isolated() {
        let files = work_list(6);
        let summary = WorkDispatcher::new(3)
            .dispatch(&files, |index, _| {
                if index == 2 {
                    anyhow::bail!("formatter failed");
                }
                if index == 4 {
                    panic!("tool thread blew up");
                }
                Ok(())
            })
            .unwrap();

        assert_eq!(summary.outcomes.len(), 6);
        assert_eq!(summary.succeeded(), 4);

        let failures: Vec<_> = summary.failures().collect();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].file, "file2.h");
        assert_eq!(failures[0].message, "formatter failed");
        assert!(failures[0].task.starts_with("srcfix-worker-"));
        assert_eq!(failures[1].file, "file4.h");
        assert!(failures[1].message.contains("tool thread blew up"));
    }

    #[test]
    fn test_outcomes_sorted_by_index() {
        let files = work_list(20);
        let summary = WorkDispatcher::new(4).dispatch(&files, |_, _| Ok(())).unwrap();
        let indices: Vec<_> = summary.outcomes.iter().map(|o| o.index).collect();
        assert_eq!(indices, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_worker_count_bounded_by_items() {
        let dispatcher = WorkDispatcher::new(8);
        assert_eq!(dispatcher.worker_count(3), 3);
        assert_eq!(dispatcher.worker_count(100), 8);
        assert_eq!(WorkDispatcher::new(0).worker_count(5), 1);
    }

    #[test]
    fn test_failure_display_names_thread_and_file() {
        let failure = TaskFailure {
            task: "srcfix-worker-1".to_string(),
            file: "a.h".to_string(),
            message: "boom".to_string(),
            trace: "boom".to_string(),
        };
        assert_eq!(
            failure.to_string(),
            "Error in thread 'srcfix-worker-1', file 'a.h': boom"
        );
    }
}

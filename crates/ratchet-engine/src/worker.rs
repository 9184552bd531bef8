//! Isolated workers.
//!
//! A worker owns its input, runs one job to completion on a fresh named
//! thread and reports exactly one `Result` back over a channel. Panics inside
//! the job become errors that name the worker.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread;

use anyhow::{Context, Result, anyhow};
use tracing::debug;

/// Stack size for threads that parse source files.
///
/// Parsing is recursive; pathological nesting needs more than the default
/// 2 MiB before the parser's own depth limit is reached.
pub const WORKER_STACK_SIZE: usize = 64 * 1024 * 1024;

pub fn run_worker<I, O, F>(name: &str, input: I, job: F) -> Result<O>
where
    I: Send + 'static,
    O: Send + 'static,
    F: FnOnce(I) -> Result<O> + Send + 'static,
{
    let (sender, receiver) = mpsc::channel();
    let worker_name = name.to_string();

    let handle = thread::Builder::new()
        .name(format!("ratchet-{name}"))
        .stack_size(WORKER_STACK_SIZE)
        .spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| job(input)));
            let result = outcome.unwrap_or_else(|panic_info| {
                Err(anyhow!(
                    "{worker_name} worker panicked: {}",
                    extract_panic_message(panic_info)
                ))
            });
            // The receiver only goes away if the caller stopped waiting
            let _ = sender.send(result);
        })
        .with_context(|| format!("failed to spawn {name} worker"))?;

    debug!(worker = name, "worker started");
    let result = receiver
        .recv()
        .map_err(|_| anyhow!("{name} worker exited without a result"))?;
    let _ = handle.join();
    debug!(worker = name, ok = result.is_ok(), "worker finished");
    result
}

fn extract_panic_message(panic_info: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    #[test]
    fn test_worker_returns_job_result() {
        let doubled = run_worker("double", vec![1, 2, 3], |input| {
            Ok(input.into_iter().map(|n| n * 2).collect::<Vec<_>>())
        })
        .unwrap();
        assert_eq!(doubled, vec![2, 4, 6]);
    }

    #[test]
    fn test_worker_runs_on_named_thread() {
        let name = run_worker("named", (), |()| {
            Ok(thread::current().name().map(str::to_string))
        })
        .unwrap();
        assert_eq!(name.as_deref(), Some("ratchet-named"));
    }

    #[test]
    fn test_worker_propagates_errors() {
        let err = run_worker("failing", (), |()| -> Result<()> { bail!("checker failed") })
            .unwrap_err();
        assert_eq!(err.to_string(), "checker failed");
    }

    #[test]
    fn test_worker_converts_panics() {
        let err = run_worker("panicking", 7, |n: i32| -> Result<i32> {
            if n > 0 {
                panic!("boom {n}");
            }
            Ok(n)
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "panicking worker panicked: boom 7");
    }
}

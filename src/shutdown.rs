//! Graceful shutdown on interrupt.
//!
//! Mode engines run on a worker thread while the main thread waits for either the worker
//! to finish or Ctrl-C. An interrupt flips the [`Shutdown`] flag and runs the registered
//! cleanup hooks (closing the session log, requesting a final counter report), then gives
//! the worker a short grace period before the process exits with status 0.

use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// How long an interrupted worker gets to emit its final output.
pub const INTERRUPT_GRACE: Duration = Duration::from_millis(250);

type Hook = Box<dyn FnOnce() + Send>;

/// Shared shutdown flag with one-shot cleanup hooks.
#[derive(Default)]
pub struct Shutdown {
    triggered: AtomicBool,
    hooks: Mutex<Vec<Hook>>,
}

impl Shutdown {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Whether shutdown has been requested.
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Register a hook to run when shutdown is triggered.
    ///
    /// If shutdown already happened the hook runs immediately.
    pub fn on_shutdown(&self, hook: impl FnOnce() + Send + 'static) {
        let mut hooks = self.hooks.lock();
        if !self.is_triggered() {
            hooks.push(Box::new(hook));
            return;
        }
        drop(hooks);
        hook();
    }

    /// Request shutdown and run every registered hook exactly once.
    pub fn trigger(&self) {
        if self.triggered.swap(true, Ordering::SeqCst) {
            return;
        }
        let hooks = std::mem::take(&mut *self.hooks.lock());
        for hook in hooks {
            hook();
        }
    }
}

/// How a mode run ended.
#[derive(Debug)]
pub enum Outcome<T> {
    /// The worker returned on its own (end of stream, closed pipe, error).
    Finished(T),
    /// Ctrl-C arrived first.
    Interrupted,
}

/// Run `job` on a worker thread until it returns or the process is interrupted.
///
/// On interrupt the shutdown hooks run and the worker gets [`INTERRUPT_GRACE`] to finish;
/// a worker still blocked on a read after that is abandoned.
pub fn run_until_interrupted<T, F>(shutdown: Arc<Shutdown>, job: F) -> anyhow::Result<Outcome<T>>
where
    T: Send + 'static,
    F: FnOnce(Arc<Shutdown>) -> T + Send + 'static,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let (done_tx, mut done_rx) = tokio::sync::oneshot::channel();
    let worker_shutdown = Arc::clone(&shutdown);
    std::thread::Builder::new()
        .name("mode-worker".to_string())
        .spawn(move || {
            let _ = done_tx.send(job(worker_shutdown));
        })?;

    let outcome = runtime.block_on(async {
        tokio::select! {
            result = &mut done_rx => match result {
                Ok(value) => Outcome::Finished(value),
                Err(_) => {
                    log::error!("mode worker exited without a result");
                    Outcome::Interrupted
                }
            },
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    log::warn!("failed to listen for interrupt: {}", e);
                }
                log::info!("interrupt received, shutting down");
                shutdown.trigger();
                let _ = tokio::time::timeout(INTERRUPT_GRACE, &mut done_rx).await;
                Outcome::Interrupted
            }
        }
    });

    runtime.shutdown_timeout(Duration::from_millis(100));
    Ok(outcome)
}

/// Whether an I/O error means our reader went away.
pub fn is_broken_pipe(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::BrokenPipe
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_hooks_run_once() {
        let shutdown = Shutdown::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        shutdown.on_shutdown(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert!(!shutdown.is_triggered());
        shutdown.trigger();
        shutdown.trigger();
        assert!(shutdown.is_triggered());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_late_hook_runs_immediately() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        let ran = Arc::new(AtomicBool::new(false));
        let r = Arc::clone(&ran);
        shutdown.on_shutdown(move || r.store(true, Ordering::SeqCst));
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_finished_worker_result_is_returned() {
        let outcome = run_until_interrupted(Shutdown::new(), |_| 7).unwrap();
        assert!(matches!(outcome, Outcome::Finished(7)));
    }
}

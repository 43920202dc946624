//! Runtime abstraction layer for async operations
//!
//! The loader continuation and the camera throttler's trailing timer are the
//! only two things this crate schedules. Both go through [`AsyncSpawner`] so
//! they can be cancelled on teardown and so tests can count how often
//! scheduling happens.

use crate::prelude::{Arc, Future, Pin};
use crate::{ChartError, Result};
use once_cell::sync::OnceCell;

/// A trait for spawning async tasks (object-safe version)
pub trait AsyncSpawner: Send + Sync + 'static {
    /// Spawn a future and return a handle to it.
    ///
    /// Fails only when there is nothing to schedule onto (e.g. no runtime
    /// is running on this thread).
    fn spawn_boxed(
        &self,
        future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>,
    ) -> Result<Box<dyn AsyncHandle>>;
}

/// Handle to a spawned async task
pub trait AsyncHandle: Send + Sync {
    /// Check if the task is finished
    fn is_finished(&self) -> bool;

    /// Cancel the task
    fn cancel(&self);
}

/// Convenience function for spawning onto the global runtime
pub fn spawn<F>(future: F) -> Result<Box<dyn AsyncHandle>>
where
    F: Future<Output = ()> + Send + 'static,
{
    log::trace!("runtime::spawn");
    runtime().spawn_boxed(Box::pin(future))
}

/// Default spawner implementations
pub mod spawners {
    use super::*;
    use futures::future::{AbortHandle, Abortable};
    use std::sync::atomic::{AtomicBool, Ordering};

    #[cfg(feature = "tokio-runtime")]
    pub mod tokio_impl {
        use super::*;
        use ::tokio::task::JoinHandle;

        /// Tokio-based async spawner. Spawns onto whichever tokio runtime is
        /// current on the calling thread.
        pub struct TokioSpawner;

        impl AsyncSpawner for TokioSpawner {
            fn spawn_boxed(
                &self,
                future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>,
            ) -> Result<Box<dyn AsyncHandle>> {
                let handle = ::tokio::runtime::Handle::try_current()
                    .map_err(|e| ChartError::Scheduling(e.to_string()))?;
                Ok(Box::new(TokioHandle(handle.spawn(future))))
            }
        }

        struct TokioHandle(JoinHandle<()>);

        impl AsyncHandle for TokioHandle {
            fn is_finished(&self) -> bool {
                self.0.is_finished()
            }

            fn cancel(&self) {
                self.0.abort();
            }
        }
    }

    /// Runs each future to completion on its own worker thread.
    ///
    /// Used when no async runtime feature is enabled. Results are posted back
    /// through the owning component's shared state, never by return value.
    pub struct ThreadSpawner;

    impl AsyncSpawner for ThreadSpawner {
        fn spawn_boxed(
            &self,
            future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>,
        ) -> Result<Box<dyn AsyncHandle>> {
            let (abort_handle, registration) = AbortHandle::new_pair();
            let finished = Arc::new(AtomicBool::new(false));
            let finished_clone = finished.clone();

            std::thread::Builder::new()
                .name("chartlet-worker".to_string())
                .spawn(move || {
                    let _ = futures::executor::block_on(Abortable::new(future, registration));
                    finished_clone.store(true, Ordering::SeqCst);
                })
                .map_err(|e| ChartError::Scheduling(e.to_string()))?;

            Ok(Box::new(ThreadHandle {
                abort_handle,
                finished,
            }))
        }
    }

    struct ThreadHandle {
        abort_handle: AbortHandle,
        finished: Arc<AtomicBool>,
    }

    impl AsyncHandle for ThreadHandle {
        fn is_finished(&self) -> bool {
            self.finished.load(Ordering::SeqCst)
        }

        fn cancel(&self) {
            self.abort_handle.abort();
        }
    }
}

/// Unified async utilities shared by the loader and the throttler
pub mod async_utils {
    #[cfg(not(feature = "tokio-runtime"))]
    use std::task::Poll;

    /// Unified async delay function that works across runtimes
    pub async fn async_delay(duration: std::time::Duration) {
        #[cfg(feature = "tokio-runtime")]
        {
            tokio::time::sleep(duration).await;
        }

        #[cfg(not(feature = "tokio-runtime"))]
        {
            // Parks until the reactor wakes us; abortable like any future
            async_io::Timer::after(duration).await;
        }
    }

    /// Yield control back to the scheduler for exactly one tick.
    pub async fn yield_now() {
        #[cfg(feature = "tokio-runtime")]
        {
            tokio::task::yield_now().await;
        }

        #[cfg(not(feature = "tokio-runtime"))]
        {
            let mut yielded = false;
            futures::future::poll_fn(|cx| {
                if yielded {
                    Poll::Ready(())
                } else {
                    yielded = true;
                    cx.waker().wake_by_ref();
                    Poll::Pending
                }
            })
            .await;
        }
    }
}

/// Global runtime instance
static RUNTIME: OnceCell<Arc<dyn AsyncSpawner>> = OnceCell::new();

/// Initialize the runtime with a specific spawner. Has no effect once the
/// global spawner has been resolved.
pub fn init_runtime(spawner: Arc<dyn AsyncSpawner>) {
    let _ = RUNTIME.set(spawner);
}

/// Get the global runtime spawner
pub fn runtime() -> Arc<dyn AsyncSpawner> {
    RUNTIME
        .get_or_init(|| {
            #[cfg(feature = "tokio-runtime")]
            {
                Arc::new(spawners::tokio_impl::TokioSpawner)
            }

            #[cfg(not(feature = "tokio-runtime"))]
            {
                Arc::new(spawners::ThreadSpawner)
            }
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[cfg(feature = "tokio-runtime")]
    #[::tokio::test]
    async fn test_tokio_spawner() {
        let handle = spawn(async {
            ::tokio::time::sleep(::tokio::time::Duration::from_millis(10)).await;
        })
        .expect("runtime available inside tokio::test");

        // Should not be finished immediately
        assert!(!handle.is_finished());

        // Wait a bit and check again
        ::tokio::time::sleep(::tokio::time::Duration::from_millis(50)).await;
        assert!(handle.is_finished());
    }

    #[cfg(feature = "tokio-runtime")]
    #[test]
    fn test_tokio_spawner_without_runtime_reports_scheduling_error() {
        let spawner = spawners::tokio_impl::TokioSpawner;
        let result = spawner.spawn_boxed(Box::pin(async {}));
        assert!(matches!(result, Err(ChartError::Scheduling(_))));
    }

    #[test]
    fn test_thread_spawner_runs_and_cancels() {
        let ran = Arc::new(AtomicBool::new(false));
        let ran_clone = ran.clone();
        let handle = spawners::ThreadSpawner
            .spawn_boxed(Box::pin(async move {
                ran_clone.store(true, Ordering::SeqCst);
            }))
            .expect("thread spawn");

        for _ in 0..200 {
            if handle.is_finished() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert!(handle.is_finished());
        assert!(ran.load(Ordering::SeqCst));

        // Cancelling a finished task is harmless
        handle.cancel();
    }

    #[cfg(not(feature = "tokio-runtime"))]
    #[test]
    fn test_async_delay_waits_without_repolling() {
        let duration = std::time::Duration::from_millis(50);
        let mut delay = Box::pin(async_utils::async_delay(duration));
        let mut polls = 0usize;

        let start = std::time::Instant::now();
        futures::executor::block_on(futures::future::poll_fn(|cx| {
            polls += 1;
            delay.as_mut().poll(cx)
        }));

        assert!(start.elapsed() >= duration);
        assert!(polls <= 4, "delay was polled {} times", polls);
    }

    #[cfg(not(feature = "tokio-runtime"))]
    #[test]
    fn test_thread_spawner_cancels_pending_delay() {
        let ran = Arc::new(AtomicBool::new(false));
        let ran_clone = ran.clone();
        let handle = spawners::ThreadSpawner
            .spawn_boxed(Box::pin(async move {
                async_utils::async_delay(std::time::Duration::from_secs(30)).await;
                ran_clone.store(true, Ordering::SeqCst);
            }))
            .expect("thread spawn");

        handle.cancel();
        for _ in 0..200 {
            if handle.is_finished() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert!(handle.is_finished());
        assert!(!ran.load(Ordering::SeqCst));
    }
}

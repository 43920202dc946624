#![cfg(feature = "tokio-runtime")]

mod common;

#[cfg(test)]
mod camera_throttle_tests {
    use super::common::{settle, CountingSpawner};
    use chartlet::prelude::*;
    use chartlet::runtime::spawners::tokio_impl::TokioSpawner;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::time::sleep;

    /// Refuses to schedule while `failing` is set; counts every attempt.
    #[derive(Default)]
    struct FlakySpawner {
        failing: AtomicBool,
        attempts: AtomicUsize,
    }

    impl AsyncSpawner for FlakySpawner {
        fn spawn_boxed(
            &self,
            future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>,
        ) -> Result<Box<dyn AsyncHandle>> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(ChartError::Scheduling("no runtime".to_string()));
            }
            TokioSpawner.spawn_boxed(future)
        }
    }

    fn throttler(interval_ms: u64, spawner: Arc<CountingSpawner>) -> CameraThrottler {
        let config = CameraThrottleConfig {
            interval_ms,
            ..CameraThrottleConfig::default()
        };
        CameraThrottler::with_scheduling(config, spawner, Arc::new(RuntimeClock))
    }

    fn payload(step: usize) -> EngineCameraPayload {
        EngineCameraPayload::new(-70.0 + step as f64 * 0.001, 42.0, 10.0 + step as f64 * 0.01)
    }

    fn expected(step: usize) -> CameraState {
        payload(step)
            .normalize(&CameraThrottleConfig::default())
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_shorter_than_interval_emits_leading_and_trailing() {
        let spawner = CountingSpawner::new();
        let throttler = throttler(100, spawner.clone());

        // 10 events, 10 ms apart: a 90 ms window
        for step in 0..10 {
            throttler.on_camera_changing(&payload(step)).unwrap();
            sleep(Duration::from_millis(10)).await;
        }
        settle(200).await;

        let emitted = throttler.try_recv_updates();
        assert!(emitted.len() <= 2, "emitted {} updates", emitted.len());
        assert_eq!(emitted.first(), Some(&expected(0)));
        assert_eq!(emitted.last(), Some(&expected(9)));
        assert_eq!(throttler.current(), Some(expected(9)));

        // One trailing timer for the whole burst
        assert_eq!(spawner.spawned(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_gesture_is_bounded_by_interval() {
        let throttler = throttler(100, CountingSpawner::new());

        // 50 events, 10 ms apart: a 490 ms window
        for step in 0..50 {
            throttler.on_camera_changing(&payload(step)).unwrap();
            sleep(Duration::from_millis(10)).await;
        }
        settle(200).await;

        let emitted = throttler.try_recv_updates();
        let bound = (490f64 / 100.0).ceil() as usize + 1;
        assert!(emitted.len() <= bound, "emitted {} > {}", emitted.len(), bound);
        assert!(emitted.len() >= 2);
        assert_eq!(emitted.last(), Some(&expected(49)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_event_emitted_exactly_once() {
        let throttler = throttler(100, CountingSpawner::new());

        throttler.on_camera_changing(&payload(0)).unwrap();
        sleep(Duration::from_millis(20)).await;
        throttler.on_camera_changing(&payload(1)).unwrap();
        sleep(Duration::from_millis(20)).await;
        // Arrives after the trailing timer was scheduled by payload(1)
        throttler.on_camera_changing(&payload(2)).unwrap();
        settle(300).await;

        let emitted = throttler.try_recv_updates();
        assert_eq!(emitted, vec![expected(0), expected(2)]);
        assert!(!throttler.has_trailing_scheduled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_passes_through_and_cancels_trailing() {
        let spawner = CountingSpawner::new();
        let throttler = throttler(100, spawner.clone());

        throttler.on_camera_changing(&payload(0)).unwrap();
        sleep(Duration::from_millis(10)).await;
        throttler.on_camera_changing(&payload(1)).unwrap();
        assert!(throttler.has_trailing_scheduled());

        sleep(Duration::from_millis(10)).await;
        throttler
            .handle_event(&CameraEvent::idle(payload(5)))
            .unwrap();
        assert_eq!(throttler.current(), Some(expected(5)));

        settle(300).await;
        let emitted = throttler.try_recv_updates();
        assert_eq!(emitted, vec![expected(0), expected(5)]);
        assert_eq!(throttler.current(), Some(expected(5)));
        assert_eq!(spawner.spawned(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_cancels_trailing_emission() {
        let throttler = throttler(100, CountingSpawner::new());

        throttler.on_camera_changing(&payload(0)).unwrap();
        sleep(Duration::from_millis(10)).await;
        throttler.on_camera_changing(&payload(1)).unwrap();
        let _ = throttler.try_recv_updates();

        throttler.teardown();
        settle(300).await;
        assert!(throttler.try_recv_updates().is_empty());

        // Events after teardown are ignored
        throttler.on_camera_changing(&payload(2)).unwrap();
        throttler.on_camera_idle(&payload(3)).unwrap();
        assert!(throttler.try_recv_updates().is_empty());
        assert_eq!(throttler.current(), Some(expected(0)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_throttler_cancels_trailing_emission() {
        let throttler = throttler(100, CountingSpawner::new());
        let updates = throttler.subscribe();

        throttler.on_camera_changing(&payload(0)).unwrap();
        sleep(Duration::from_millis(10)).await;
        throttler.on_camera_changing(&payload(1)).unwrap();
        drop(throttler);

        settle(300).await;
        assert_eq!(updates.try_iter().collect::<Vec<_>>(), vec![expected(0)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_events_emit_immediately() {
        let spawner = CountingSpawner::new();
        let throttler = throttler(100, spawner.clone());

        for step in 0..3 {
            throttler.on_camera_changing(&payload(step)).unwrap();
            sleep(Duration::from_millis(150)).await;
        }

        assert_eq!(
            throttler.try_recv_updates(),
            vec![expected(0), expected(1), expected(2)]
        );
        assert_eq!(spawner.spawned(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_finite_payload_is_rejected() {
        let throttler = throttler(100, CountingSpawner::new());
        let bad = EngineCameraPayload::new(f64::NAN, 0.0, 3.0);

        assert!(matches!(
            throttler.on_camera_changing(&bad),
            Err(ChartError::InvalidCamera(_))
        ));
        assert!(throttler.current().is_none());
        assert_eq!(throttler.emitted_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_trailing_schedule_is_retried_by_next_event() {
        let spawner = Arc::new(FlakySpawner::default());
        spawner.failing.store(true, Ordering::SeqCst);
        let config = CameraThrottleConfig {
            interval_ms: 100,
            ..CameraThrottleConfig::default()
        };
        let throttler =
            CameraThrottler::with_scheduling(config, spawner.clone(), Arc::new(RuntimeClock));

        throttler.on_camera_changing(&payload(0)).unwrap();
        sleep(Duration::from_millis(10)).await;
        assert!(matches!(
            throttler.on_camera_changing(&payload(1)),
            Err(ChartError::Scheduling(_))
        ));
        assert!(!throttler.has_trailing_scheduled());

        // Still inside the window: schedules again instead of coalescing
        sleep(Duration::from_millis(10)).await;
        assert!(throttler.on_camera_changing(&payload(2)).is_err());
        assert_eq!(spawner.attempts.load(Ordering::SeqCst), 2);

        spawner.failing.store(false, Ordering::SeqCst);
        sleep(Duration::from_millis(10)).await;
        throttler.on_camera_changing(&payload(3)).unwrap();
        assert!(throttler.has_trailing_scheduled());
        assert_eq!(spawner.attempts.load(Ordering::SeqCst), 3);

        settle(200).await;
        assert_eq!(throttler.try_recv_updates(), vec![expected(0), expected(3)]);
        assert!(!throttler.has_trailing_scheduled());
    }
}

//! Environment abstraction for deterministic testing.
//!
//! Decouples session and client logic from system resources (time,
//! randomness). Production code uses [`SystemEnv`]; tests use
//! [`test_utils::MockEnv`] with a manually advanced clock.

use std::{
    ops::{Add, Sub},
    time::Duration,
};

/// Abstract environment providing time, randomness, and async sleep.
///
/// Implementations MUST guarantee:
///
/// - `now()` never goes backwards within one execution context
/// - `random_bytes()` uses cryptographically secure entropy in production
pub trait Environment: Clone + Send + Sync + 'static {
    /// The instant type used by this environment.
    ///
    /// Production environments use `std::time::Instant`; test environments
    /// may substitute a virtual clock with the same arithmetic.
    type Instant: Copy
        + Ord
        + Send
        + Sync
        + Add<Duration, Output = Self::Instant>
        + Sub<Output = Duration>;

    /// Current time (monotonic).
    fn now(&self) -> Self::Instant;

    /// Sleep for the specified duration.
    ///
    /// The only async method in the trait; it belongs in driver code, never
    /// in state-machine logic.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Fill the buffer with random bytes.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generate a random `u128`.
    ///
    /// Used for correlation ids on optimistic sends.
    fn random_u128(&self) -> u128 {
        let mut bytes = [0u8; 16];
        self.random_bytes(&mut bytes);
        u128::from_be_bytes(bytes)
    }
}

/// Production environment backed by the system clock and OS entropy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl Environment for SystemEnv {
    type Instant = std::time::Instant;

    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        use rand::RngCore;
        rand::rngs::OsRng.fill_bytes(buffer);
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils {
    //! Deterministic environment for tests.

    use std::{
        sync::{
            Arc, Mutex,
            atomic::{AtomicU64, Ordering},
        },
        time::{Duration, Instant},
    };

    use super::Environment;

    /// Deterministic environment with a manually advanced clock and a
    /// counter-based byte source.
    #[derive(Debug, Clone)]
    pub struct MockEnv {
        epoch: Instant,
        elapsed: Arc<Mutex<Duration>>,
        counter: Arc<AtomicU64>,
    }

    impl MockEnv {
        /// Create a mock environment at time zero.
        pub fn new() -> Self {
            Self {
                epoch: Instant::now(),
                elapsed: Arc::new(Mutex::new(Duration::ZERO)),
                counter: Arc::new(AtomicU64::new(1)),
            }
        }

        /// Advance the virtual clock.
        pub fn advance(&self, by: Duration) {
            if let Ok(mut elapsed) = self.elapsed.lock() {
                *elapsed += by;
            }
        }
    }

    impl Default for MockEnv {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Environment for MockEnv {
        type Instant = Instant;

        fn now(&self) -> Instant {
            let elapsed = self.elapsed.lock().map_or(Duration::ZERO, |e| *e);
            self.epoch + elapsed
        }

        fn sleep(&self, _duration: Duration) -> impl std::future::Future<Output = ()> + Send {
            async {}
        }

        fn random_bytes(&self, buffer: &mut [u8]) {
            for chunk in buffer.chunks_mut(8) {
                let value = self.counter.fetch_add(1, Ordering::Relaxed);
                for (dst, src) in chunk.iter_mut().zip(value.to_be_bytes()) {
                    *dst = src;
                }
            }
        }
    }

}

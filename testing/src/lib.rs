//! # Cinereview Testing
//!
//! Testing utilities shared by the Cinereview crates.
//!
//! This crate provides:
//! - `MockClock`: a settable, advanceable [`Clock`] for token expiry and
//!   review timestamps
//! - Property-based testing strategies for ratings
//! - A one-line tracing setup for noisy test debugging
//!
//! ## Example
//!
//! ```
//! use cinereview_testing::MockClock;
//! use cinereview_core::Clock;
//! use chrono::Duration;
//!
//! let clock = MockClock::default();
//! let start = clock.now();
//! clock.advance(Duration::hours(24));
//! assert_eq!(clock.now() - start, Duration::hours(24));
//! ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use cinereview_core::environment::Clock;
use std::sync::{Arc, Mutex, PoisonError};

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Arc, Clock, DateTime, Duration, Mutex, PoisonError, TimeZone, Utc};

    /// Controllable clock for deterministic tests.
    ///
    /// Clones share the same instant, so a test can keep one handle and hand
    /// another to the service under test.
    ///
    /// # Example
    ///
    /// ```
    /// use cinereview_testing::mocks::MockClock;
    /// use cinereview_core::environment::Clock;
    /// use chrono::Duration;
    ///
    /// let clock = MockClock::default();
    /// let service_clock = clock.clone();
    /// let before = service_clock.now();
    /// clock.advance(Duration::seconds(5));
    /// assert_eq!(service_clock.now(), before + Duration::seconds(5));
    /// ```
    #[derive(Debug, Clone)]
    pub struct MockClock {
        time: Arc<Mutex<DateTime<Utc>>>,
    }

    impl MockClock {
        /// Create a clock frozen at `time`.
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(Mutex::new(time)),
            }
        }

        /// Jump to `time`.
        pub fn set(&self, time: DateTime<Utc>) {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner) = time;
        }

        /// Move forward by `by`.
        pub fn advance(&self, by: Duration) {
            let mut time = self.time.lock().unwrap_or_else(PoisonError::into_inner);
            *time += by;
        }
    }

    impl Default for MockClock {
        /// 2025-01-01 00:00:00 UTC.
        fn default() -> Self {
            Self::new(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().unwrap_or_default())
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// Create a default mock clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> MockClock {
        MockClock::default()
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::prelude::*;

    /// Any accepted star rating.
    pub fn valid_rating() -> impl Strategy<Value = i64> {
        1i64..=5
    }

    /// Integers outside the accepted rating range.
    pub fn invalid_rating() -> impl Strategy<Value = i64> {
        prop_oneof![i64::MIN..=0, 6i64..=i64::MAX]
    }

    /// Non-blank review content.
    pub fn review_content() -> impl Strategy<Value = String> {
        "[a-zA-Z][a-zA-Z ]{0,40}"
    }
}

/// Test helpers.
pub mod helpers {
    /// Install a `tracing` subscriber honouring `RUST_LOG`, once per process.
    ///
    /// Output goes through the test writer so it is captured per test.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}

// Re-export commonly used items
pub use mocks::{MockClock, test_clock};

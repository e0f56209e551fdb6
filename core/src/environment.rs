//! Environment traits injected into services.
//!
//! All access to wall-clock time goes through [`Clock`] so that services can
//! be exercised with a controllable clock in tests.

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Clock trait - abstracts time operations for testability
///
/// # Examples
///
/// ```
/// use cinereview_core::environment::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let earlier = clock.now();
/// assert!(clock.now() >= earlier);
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Shared, type-erased clock handle held by services.
pub type SharedClock = Arc<dyn Clock>;

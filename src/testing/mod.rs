//! Test doubles shared by unit and router tests.

mod fake_store;
mod random;

pub use fake_store::{FailPoint, FakeUserStore};
pub use random::random_email;

use jiff::Timestamp;

use crate::utils::clock::Clock;

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl FixedClock {
    pub fn at(rfc3339: &str) -> Self {
        Self(rfc3339.parse().expect("valid RFC 3339 timestamp"))
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::at("2024-01-01T00:00:00Z")
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

//! Freeze watchdog
//!
//! Counts dispatches within one host frame. Once the ceiling is reached the
//! interpreter yields for the rest of the tick. This is a scheduling guarantee,
//! not an error.

use serde::{Deserialize, Serialize};

/// Per-tick dispatch counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreezeWatchdog {
    limit: u32,
    frame_seen: Option<u64>,
    count: u32,
}

impl FreezeWatchdog {
    pub fn new(limit: u32) -> Self {
        Self {
            limit: limit.max(1),
            frame_seen: None,
            count: 0,
        }
    }

    /// Record one dispatch during host frame `frame_count`.
    /// Returns true when the interpreter must yield.
    pub fn tick(
        &mut self,
        frame_count: u64,
    ) -> bool {
        if self.frame_seen != Some(frame_count) {
            self.frame_seen = Some(frame_count);
            self.count = 0;
        }
        self.count = self.count.saturating_add(1);
        self.count >= self.limit
    }

    /// Dispatches counted in the current frame
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trips_at_limit() {
        let mut dog = FreezeWatchdog::new(3);
        assert!(!dog.tick(7));
        assert!(!dog.tick(7));
        assert!(dog.tick(7));
    }

    #[test]
    fn test_resets_on_new_frame() {
        let mut dog = FreezeWatchdog::new(2);
        assert!(!dog.tick(1));
        assert!(dog.tick(1));
        assert!(!dog.tick(2));
        assert_eq!(dog.count(), 1);
    }
}

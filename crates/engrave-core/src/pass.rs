//! The one piece of state shared across passes: which pass is current
//!
//! Starting a pass swaps the current id; everything still holding an older
//! id is stale from that moment on. Completion order of background loads is
//! not guaranteed to follow start order, so every late result is checked
//! against the tracker before it is allowed to touch the canvas.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identifies one render pass; later passes compare greater
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PassId(u64);

impl PassId {
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pass#{}", self.0)
    }
}

/// Hands out pass ids and remembers the newest one
#[derive(Debug, Clone, Default)]
pub struct PassTracker {
    current: Arc<AtomicU64>,
}

impl PassTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new pass, invalidating whichever pass was current
    pub fn begin(&self) -> PassToken {
        let id = PassId(self.current.fetch_add(1, Ordering::AcqRel) + 1);
        PassToken {
            id,
            tracker: self.clone(),
        }
    }

    /// The newest pass, or None before the first one starts
    pub fn current(&self) -> Option<PassId> {
        match self.current.load(Ordering::Acquire) {
            0 => None,
            n => Some(PassId(n)),
        }
    }

    pub fn is_current(&self, id: PassId) -> bool {
        self.current.load(Ordering::Acquire) == id.0
    }
}

/// A pass id that can still ask whether it has been superseded
///
/// Cloned into background jobs so they can give up early.
#[derive(Debug, Clone)]
pub struct PassToken {
    id: PassId,
    tracker: PassTracker,
}

impl PassToken {
    pub fn id(&self) -> PassId {
        self.id
    }

    pub fn is_stale(&self) -> bool {
        !self.tracker.is_current(self.id)
    }
}

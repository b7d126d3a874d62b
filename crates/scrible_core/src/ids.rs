//! crates/scrible_core/src/ids.rs
//!
//! Record id generators.

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::debug;
use uuid::Uuid;

use crate::ports::{IdGenerator, PortError, PortResult};

/// How many candidate ids are drawn before giving up.
pub const MAX_ID_ATTEMPTS: usize = 64;

/// Draws candidates from `ids` until one is not `taken`.
pub fn draw_unused_id(
    ids: &dyn IdGenerator,
    taken: impl Fn(&str) -> bool,
) -> PortResult<String> {
    for _ in 0..MAX_ID_ATTEMPTS {
        let candidate = ids.next_id();
        if !taken(&candidate) {
            return Ok(candidate);
        }
        debug!("Id {} already taken, drawing another", candidate);
    }
    Err(PortError::Unexpected(format!(
        "could not generate a unique id in {} attempts",
        MAX_ID_ATTEMPTS
    )))
}

/// Millisecond Unix timestamps rendered as decimal strings, strictly increasing
/// within one process even when several ids are drawn in the same millisecond.
///
/// Only collision-free while a single writer owns the data directory.
#[derive(Debug, Default)]
pub struct TimestampIds {
    last: AtomicI64,
}

impl TimestampIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for TimestampIds {
    fn next_id(&self) -> String {
        let now = Utc::now().timestamp_millis();
        let prev = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(prev + 1).to_string()
    }
}

/// Random v4 UUIDs, for data directories shared by several writers.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

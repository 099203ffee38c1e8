//! Per-client fixed-window rate limiting
//!
//! Counts requests per client id in fixed wall-clock windows. A fixed-window
//! counter admits bursts across a window boundary (up to twice the ceiling in
//! a short span); this is a known limitation of the scheme, not a defect.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// One client's window state; replaced wholesale once the window expires
#[derive(Debug, Clone)]
struct WindowRecord {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window request counter keyed by client id
///
/// `admit` is the only mutation entry point. The record map is mutex-guarded
/// so the read-check-increment sequence is atomic under concurrent requests;
/// two callers racing at the ceiling cannot both be admitted past it.
pub struct FixedWindowLimiter {
    ceiling: u32,
    window: Duration,
    records: Mutex<HashMap<String, WindowRecord>>,
}

impl FixedWindowLimiter {
    pub fn new(ceiling: u32, window: Duration) -> Self {
        Self {
            ceiling,
            window,
            records: Mutex::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Admit or reject one request for `client_id` at time `now`
    ///
    /// Absent or expired records are replaced with a fresh window counting
    /// this request; live records are incremented while below the ceiling.
    pub fn admit(&self, client_id: &str, now: Instant) -> bool {
        if self.ceiling == 0 {
            return false;
        }

        let mut records = self.records.lock().unwrap();

        match records.get_mut(client_id) {
            Some(record) if now < record.reset_at => {
                if record.count < self.ceiling {
                    record.count += 1;
                    true
                } else {
                    tracing::warn!(
                        client_id = %client_id,
                        ceiling = self.ceiling,
                        "Rate limit exceeded"
                    );
                    false
                }
            }
            _ => {
                records.insert(
                    client_id.to_string(),
                    WindowRecord {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                true
            }
        }
    }

    /// Remove records whose window expired more than `grace` ago
    ///
    /// Bounds memory under many distinct client ids; run periodically from a
    /// background task. Returns the number of records removed.
    pub fn sweep_expired(&self, now: Instant, grace: Duration) -> usize {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|_, record| record.reset_at + grace > now);
        let swept = before - records.len();

        if swept > 0 {
            tracing::debug!(swept = swept, remaining = records.len(), "Swept expired rate-limit records");
        }

        swept
    }

    /// Number of client records currently tracked
    pub fn tracked_clients(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

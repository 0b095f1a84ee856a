//! Rolling memory estimate used to gate chunk submission during Transform
//! (C5 "Memory" half).
//!
//! The Transformer has no cheap way to read true RSS per chunk, so it
//! estimates: each chunk's contribution is approximated from the raw byte
//! size of the messages it carries. This is deliberately conservative —
//! the goal is a back-pressure signal, not a precise accounting.

use serde::{Deserialize, Serialize};

use crate::core::constants::MEMORY_BACKPRESSURE_RATIO;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub used_mb: f64,
    pub peak_mb: f64,
    pub limit_mb: u64,
    pub percent: f64,
}

#[derive(Debug)]
pub struct MemoryMonitor {
    limit_mb: u64,
    used_bytes: u64,
    peak_bytes: u64,
}

impl MemoryMonitor {
    pub fn new(limit_mb: u64) -> Self {
        Self {
            limit_mb,
            used_bytes: 0,
            peak_bytes: 0,
        }
    }

    pub fn reserve(&mut self, bytes: u64) {
        self.used_bytes = self.used_bytes.saturating_add(bytes);
        self.peak_bytes = self.peak_bytes.max(self.used_bytes);
    }

    pub fn release(&mut self, bytes: u64) {
        self.used_bytes = self.used_bytes.saturating_sub(bytes);
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        let limit_bytes = self.limit_mb.saturating_mul(1024 * 1024).max(1);
        MemorySnapshot {
            used_mb: self.used_bytes as f64 / (1024.0 * 1024.0),
            peak_mb: self.peak_bytes as f64 / (1024.0 * 1024.0),
            limit_mb: self.limit_mb,
            percent: (self.used_bytes as f64 / limit_bytes as f64) * 100.0,
        }
    }

    /// True once usage reaches the back-pressure threshold
    /// (`MEMORY_BACKPRESSURE_RATIO` of the configured ceiling).
    pub fn should_backpressure(&self) -> bool {
        let limit_bytes = self.limit_mb.saturating_mul(1024 * 1024) as f64;
        self.used_bytes as f64 >= limit_bytes * MEMORY_BACKPRESSURE_RATIO
    }
}

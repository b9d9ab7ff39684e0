//! Cache metrics for diagnostics and telemetry.

use serde::{Deserialize, Serialize};

/// Point-in-time snapshot of cache effectiveness.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheMetrics {
    /// Number of `get` calls served from cache
    pub hit_count: u64,

    /// Number of `get` calls that found nothing servable
    pub miss_count: u64,

    /// hit_count / (hit_count + miss_count), 0.0 when no lookups yet
    pub hit_rate: f64,

    /// Total bytes currently cached
    pub current_total_bytes: u64,

    /// Configured byte budget
    pub max_total_bytes: u64,

    /// Number of entries currently cached
    pub entry_count: usize,

    /// Entries evicted since the cache was created
    pub eviction_count: u64,
}

impl CacheMetrics {
    /// Compute the hit rate from raw counters.
    pub fn compute_hit_rate(hits: u64, misses: u64) -> f64 {
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    /// Cache usage as a fraction of the budget.
    pub fn usage(&self) -> f64 {
        if self.max_total_bytes == 0 {
            return 0.0;
        }
        self.current_total_bytes as f64 / self.max_total_bytes as f64
    }

    /// Returns `true` if the cache is near capacity (>90%).
    pub fn is_near_capacity(&self) -> bool {
        self.usage() > 0.9
    }
}

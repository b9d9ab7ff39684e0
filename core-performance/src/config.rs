//! Prefetch configuration

use core_runtime::config::DEFAULT_PREFETCH_OFFSETS;

/// Configuration for the prefetch window.
///
/// The default window (one song behind, two ahead) was chosen empirically;
/// it is a tunable, not a contract. Larger windows trade cache budget for
/// resilience to fast navigation.
#[derive(Debug, Clone)]
pub struct PrefetchConfig {
    /// Index offsets from the current song to prefetch.
    pub offsets: Vec<i64>,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            offsets: DEFAULT_PREFETCH_OFFSETS.to_vec(),
        }
    }
}

impl PrefetchConfig {
    pub fn new(offsets: Vec<i64>) -> Self {
        Self { offsets }
    }

    /// The valid setlist indices for the window around `current_index`,
    /// in offset order.
    pub fn window_for(&self, current_index: usize, song_count: usize) -> Vec<usize> {
        self.offsets
            .iter()
            .filter_map(|offset| {
                let index = current_index as i64 + offset;
                if index >= 0 && (index as usize) < song_count {
                    Some(index as usize)
                } else {
                    None
                }
            })
            .collect()
    }
}

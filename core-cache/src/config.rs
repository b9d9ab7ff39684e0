//! Cache configuration

/// Configuration for the content cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum cache size in bytes (default: 512 MiB)
    pub max_total_bytes: u64,

    /// Verify payload hashes on read (default: true)
    pub verify_integrity: bool,

    /// Write blob payloads through to the backing store (default: true)
    pub persist_payloads: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_total_bytes: 512 * 1024 * 1024,
            verify_integrity: true,
            persist_payloads: true,
        }
    }
}

impl CacheConfig {
    /// Create a new cache configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum cache size.
    pub fn with_max_total_bytes(mut self, bytes: u64) -> Self {
        self.max_total_bytes = bytes;
        self
    }

    /// Enable or disable hash verification on read.
    pub fn with_verify_integrity(mut self, verify: bool) -> Self {
        self.verify_integrity = verify;
        self
    }

    /// Enable or disable write-through persistence.
    pub fn with_persist_payloads(mut self, persist: bool) -> Self {
        self.persist_payloads = persist;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_total_bytes == 0 {
            return Err("max_total_bytes must be greater than 0".to_string());
        }
        Ok(())
    }
}

//! Log initialization, cache statistics and timing macros

use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Resource metrics for structured logging.
///
/// Tracks approximate memory held by an operation cache and its hit/miss
/// statistics. All operations are atomic and lock-free.
#[derive(Debug, Default)]
pub struct ResourceMetrics {
    /// Total memory allocated in bytes (approximate)
    memory_allocated: AtomicU64,
    /// Cache hit count
    cache_hits: AtomicU64,
    /// Cache miss count
    cache_misses: AtomicU64,
}

impl ResourceMetrics {
    /// Create a new ResourceMetrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a memory allocation
    pub fn record_allocation(&self, bytes: u64) {
        self.memory_allocated.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record a cache hit
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache miss
    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current memory allocated in bytes
    pub fn memory_allocated(&self) -> u64 {
        self.memory_allocated.load(Ordering::Relaxed)
    }

    /// Get total cache lookups (hits + misses)
    pub fn total_cache_lookups(&self) -> u64 {
        self.cache_hits() + self.cache_misses()
    }

    /// Get cache hit count
    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    /// Get cache miss count
    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.load(Ordering::Relaxed)
    }

    /// Get cache hit rate as a percentage (0.0-100.0)
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.total_cache_lookups();
        if total == 0 {
            0.0
        } else {
            (self.cache_hits() as f64 / total as f64) * 100.0
        }
    }
}

/// Log resource metrics at debug level.
///
/// Usage:
/// ```rust,ignore
/// let cache = ExportCache::new();
/// // ... run an export ...
/// log_resource_metrics!(cache.metrics(), "export");
/// ```
#[macro_export]
macro_rules! log_resource_metrics {
    ($metrics:expr, $name:expr) => {
        tracing::debug!(
            operation = $name,
            memory_allocated = $metrics.memory_allocated(),
            cache_hits = $metrics.cache_hits(),
            cache_misses = $metrics.cache_misses(),
            cache_hit_rate = $metrics.cache_hit_rate(),
            "resource_metrics"
        );
    };
}

/// Helper macro for logging elapsed time at trace level.
///
/// Usage:
/// ```rust,ignore
/// let start = Instant::now();
/// // ... some work ...
/// trace_time!(start, "build_forest");
/// trace_time!(start, "build_forest", roots = forest.len());
/// ```
#[macro_export]
macro_rules! trace_time {
    ($start:expr, $name:expr) => {
        tracing::trace!(elapsed = ?$start.elapsed(), $name);
    };
    ($start:expr, $name:expr $(, $field:ident = $value:expr)*) => {
        tracing::trace!(elapsed = ?$start.elapsed(), $($field = $value),*, $name);
    };
}

/// Target prefix shared by the CLI and core crates
const LOG_TARGET: &str = "blockport";

/// Filter directive for the given flags: an explicit level wins over
/// `--verbose`, and a bare level is scoped to blockport's own targets
pub fn filter_directive(verbose: bool, log_level: Option<&str>) -> String {
    match log_level.map(str::trim).filter(|l| !l.is_empty()) {
        Some(level) if level.contains('=') => level.to_string(),
        Some(level) => format!("{}={}", LOG_TARGET, level),
        None if verbose => format!("{}=debug", LOG_TARGET),
        None => format!("{}=warn", LOG_TARGET),
    }
}

/// Initialize structured logging to stderr.
///
/// `BLOCKPORT_LOG` takes precedence over the flags.
pub fn init_tracing(
    verbose: bool,
    log_level: Option<&str>,
    log_json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_env("BLOCKPORT_LOG")
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbose, log_level)));
    let registry = tracing_subscriber::registry().with(filter);

    if log_json {
        let span_events = fmt::format::FmtSpan::NEW | fmt::format::FmtSpan::CLOSE;
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_ansi(false)
                    .with_span_events(span_events),
            )
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_hit_rate_empty() {
        let metrics = ResourceMetrics::new();
        assert_eq!(metrics.total_cache_lookups(), 0);
        assert_eq!(metrics.cache_hit_rate(), 0.0);
    }

    #[test]
    fn test_cache_hit_rate() {
        let metrics = ResourceMetrics::new();
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_miss();
        assert_eq!(metrics.total_cache_lookups(), 4);
        assert_eq!(metrics.cache_hit_rate(), 75.0);
    }

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive(false, None), "blockport=warn");
        assert_eq!(filter_directive(true, None), "blockport=debug");
        assert_eq!(filter_directive(true, Some("trace")), "blockport=trace");
        assert_eq!(filter_directive(false, Some("blockport_core=info")), "blockport_core=info");
        assert_eq!(filter_directive(false, Some("  ")), "blockport=warn");
    }

    #[test]
    fn test_record_allocation() {
        let metrics = ResourceMetrics::new();
        metrics.record_allocation(128);
        metrics.record_allocation(64);
        assert_eq!(metrics.memory_allocated(), 192);
    }
}

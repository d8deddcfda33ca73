//! Tracing utilities for query rendering and accessor resolution.
//!
//! Enable the `tracing` feature to emit events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site.

/// Emit a debug-level tracing event with the SQL text and parameter count.
///
/// ```ignore
/// joinwise_trace_render!(&query.sql, query.params.len());
/// ```
#[macro_export]
macro_rules! joinwise_trace_render {
    ($sql:expr, $param_count:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(sql = %$sql, params = $param_count, "joinwise.render");
    };
}

/// Emit a trace-level event when an accessor misses the resolution cache.
///
/// ```ignore
/// joinwise_trace_cache!(owner.name(), member);
/// ```
#[macro_export]
macro_rules! joinwise_trace_cache {
    ($owner:expr, $member:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::trace!(owner = $owner, member = $member, "joinwise.accessor.miss");
    };
}

/// Emit a debug-level event for a projected-subset property with no source column.
#[macro_export]
macro_rules! joinwise_trace_skip {
    ($source:expr, $property:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(source = $source, property = $property, "joinwise.projection.skip");
    };
}

//! Logging and tracing facilities for Horizon Binding.
//!
//! Horizon Binding uses the `tracing` crate for instrumentation. The library
//! never installs a subscriber; to see logs, install one in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!
//!     // Your application code...
//! }
//! ```
//!
//! Every event is emitted under one of the [`targets`] so subsystems can be
//! filtered individually, e.g. `RUST_LOG=horizon_binding::schema=debug`.

/// Span names used throughout Horizon Binding for tracing.
pub mod span_names {
    /// Schema resolution span.
    pub const SCHEMA_RESOLVE: &str = "horizon_binding::schema::resolve";
    /// Mapper population span.
    pub const MAPPER_POPULATE: &str = "horizon_binding::mapper::populate";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "horizon_binding_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_binding_core::signal";
    /// Schema registry and index assignment target.
    pub const SCHEMA: &str = "horizon_binding::schema";
    /// Descriptor model reads and writes target.
    pub const MODEL: &str = "horizon_binding::model";
    /// Widget mapper and cell view target.
    pub const MAPPER: &str = "horizon_binding::mapper";
    /// Mapping configuration target.
    pub const CONFIG: &str = "horizon_binding::config";
}

/// A performance tracing span guard.
///
/// Enters an `info`-level span named `perf` with the given operation name
/// and exits it when dropped. Subscribers that record span timings (or
/// `tracing_subscriber::fmt` with span events enabled) report the duration.
///
/// # Example
///
/// ```
/// use horizon_binding_core::PerfSpan;
///
/// {
///     let _span = PerfSpan::new("expensive_operation");
///     // ... work ...
/// }
/// ```
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create and enter a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_binding::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}

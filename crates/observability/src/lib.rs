//! Process-wide tracing setup shared by the binaries.

/// Initialize process-wide logging with the `info` default.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init("info");
}

/// Tracing configuration (filters, formatter).
pub mod tracing;

//! Time source port.

/// Wall clock abstraction.
///
/// Limiter arithmetic takes time as an explicit input rather than reading
/// ambient globals, so the algorithms can be driven deterministically in
/// tests.
pub trait Clock: Send + Sync {
    /// Current time as fractional seconds since the Unix epoch.
    fn now(&self) -> f64;
}

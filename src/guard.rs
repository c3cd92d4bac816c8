use crate::AdminSignal;

/// Whether gateway filtering applies to a request.
///
/// Admin page renders are exempt so merchants see every method in their
/// order screens; asynchronous calls are filtered even from admin, matching
/// what the storefront would show.
#[must_use]
pub fn should_filter(signal: AdminSignal) -> bool {
    !(signal.is_admin && !signal.is_async)
}

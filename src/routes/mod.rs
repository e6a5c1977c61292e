/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated
/// modules, so access control is applied explicitly at the module level (via
/// Axum layers) rather than per handler.

/// Routes accessible to all clients: the catalog listings and the two
/// account-flow endpoints.
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware.
/// Require an established session.
pub mod authenticated;

/// Router Module Index
///
/// Organizes the routing surface into tier-segregated modules. A path
/// whose methods span tiers lives in the module of its least restricted
/// tier, and the stricter methods enforce their own gate in the handler
/// (the `AuthUser` extractor yields 401, `require_admin` yields 403), so
/// no endpoint's protection depends on where it is registered.

/// Routes whose least restricted method is anonymous.
pub mod public;

/// Routes requiring a verified bearer token, wrapped in the auth layer.
pub mod authenticated;

/// Routes restricted exclusively to the admin role.
pub mod admin;

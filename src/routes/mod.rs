/// Router Module Index
///
/// Splits the portal's routes by who may reach them. The page routes of both modules run
/// behind the route guard; form actions and operator endpoints do not.

/// Landing, registration and login pages plus their form actions and operator endpoints.
pub mod public;

/// The dashboard and the actions that need a stored session.
pub mod authenticated;

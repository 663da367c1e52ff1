//! The API endpoints URIs.

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The dashboard page with the filter form, summary cards and charts.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for applying the filter form.
pub const FILTERS_API: &str = "/api/filters";
/// The route for resetting the filter criteria.
pub const CLEAR_FILTERS_API: &str = "/api/filters/clear";
/// The route for the dashboard data as JSON.
pub const DASHBOARD_API: &str = "/api/dashboard";

//! Well-known hook names forming the extension contract.

/// Action fired with the per-dispatch `RouteRequest`; handlers claim it.
pub const ROUTE_REQUEST: &str = "route_request";

/// Action fired when no `route_request` listener claimed the request.
pub const ROUTE_NOT_FOUND: &str = "route_not_found";

/// Filter over the default not-found message (`String`).
pub const NOT_FOUND_MESSAGE: &str = "404_message";

/// Action fired once before the application is ready.
pub const APP_INIT: &str = "app_init";

/// Action fired once the application finished booting.
pub const APP_READY: &str = "app_ready";

/// Filter over the final response body (`String`).
pub const APP_OUTPUT: &str = "app_output";

/// Action fired after the response was produced.
pub const APP_SHUTDOWN: &str = "app_shutdown";

/// Action fired when a deprecated API is used.
pub const DEPRECATION_WARNING: &str = "deprecation_warning";

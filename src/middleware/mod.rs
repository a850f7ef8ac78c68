// Middleware modules: bearer auth and trusted-host filtering.

pub mod auth;
pub mod auth_middleware;
pub mod host_filter;

pub use auth::AuthenticatedUser;
pub use auth_middleware::auth_middleware;
pub use host_filter::host_filter_middleware;

// First, declare the modules folder itself
mod modules;

// Re-export everything from modules for easier access
pub use modules::{
    auth,
    config,
    context,
    http,
    notifications,
    resources,
    routing,
    security,
    utils,
};

// Re-export commonly used types
pub use modules::auth::session::{SessionInfo, SessionManager};
pub use modules::config::ClientConfig;
pub use modules::context::UrbanClient;
pub use modules::http::{ApiError, ApiErrorKind, RequestPipeline};
pub use modules::routing::{GuardDecision, Route, RouteGuard};

// Constants
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
pub const LOGIN_PATH: &str = "/v1/auth/login";
pub const REGISTER_PATH: &str = "/v1/auth/register";
pub const ROLE_PREFIX: &str = "ROLE_";
pub const NOTIFICATION_TTL_MS: u64 = 5000;

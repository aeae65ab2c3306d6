pub mod guard;
pub mod router;
pub mod routes;

pub use guard::{GuardDecision, RouteGuard};
pub use router::{Location, Navigation, Router};
pub use routes::{Navigator, Route, HOME};

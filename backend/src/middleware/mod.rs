pub mod auth;
pub mod logging;
pub mod rate_limit;
pub mod request_id;

pub use auth::*;
pub use logging::*;
pub use rate_limit::{client_ip, rate_limit, request_client_ip, RateLimiter};
pub use request_id::*;

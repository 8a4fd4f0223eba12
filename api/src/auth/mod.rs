//! Authentication
//!
//! Session token extraction, the auth middleware and the session cookie.

pub mod cookie;
pub mod session;

pub use cookie::{clear_session_cookie, session_cookie};
pub use session::{auth_middleware, require_role};

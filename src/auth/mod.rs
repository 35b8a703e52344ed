//! HTTP Basic authentication against the user store

pub mod middleware;
pub mod password;

pub use middleware::{authenticate, parse_basic_credentials, require_auth, Credentials, CurrentUser};
pub use password::{hash_password, verify_password};

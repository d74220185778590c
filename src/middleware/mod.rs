pub mod auth;

pub use auth::{jwt_auth, require_prime_admin, AuthUser};

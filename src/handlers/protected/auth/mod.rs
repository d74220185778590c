pub mod whoami; // GET /api/auth/whoami - session introspection

pub use whoami::whoami;

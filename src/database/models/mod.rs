pub mod user;

pub use user::{AdminRequest, ApprovalStatus, Role, User};

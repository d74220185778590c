//! Signed admin-approval links.
//!
//! A Prime Admin can approve or reject a role-elevation request by
//! following an emailed link, without being logged in. The link encodes
//! the subject, the action, and an expiry, authenticated by a keyed hash
//! so nothing needs to be stored server-side.

pub mod action;
pub mod issuer;
pub mod pages;
pub mod signature;

pub use action::{ActionOutcome, ApprovalAction};

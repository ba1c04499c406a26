//! Typed wrappers over the backend endpoints, one module per area.
//! Each failure-message helper reproduces what the matching view shows the user.

pub mod admin;
pub mod auth;
pub mod resume;

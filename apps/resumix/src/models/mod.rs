pub mod admin;
pub mod analysis;
pub mod user;

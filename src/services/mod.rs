pub mod admin;
pub mod guard;

pub mod accounts;
pub mod auth;
pub mod college;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod roles;
pub mod services;

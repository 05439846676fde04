pub mod auth;
pub mod cli;
pub mod core;
pub mod database;
pub mod error;
pub mod session;
pub mod swipe;
pub mod types;
pub mod utils;
pub mod web;

pub use web::start_web_server;

pub mod bot;
pub mod channel;
pub mod commands;
pub mod config;
pub mod constants;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

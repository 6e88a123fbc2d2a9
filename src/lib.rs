pub mod analytics;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod export;
pub mod reminders;
pub mod state;
pub mod subscriptions;

pub mod api;
pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod mailchimp;

#[cfg(test)]
pub mod testing;

pub mod config;
pub mod error;
pub mod pose;
pub mod session;
pub mod tracker;

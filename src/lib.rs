pub mod ai;
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod interfaces;
pub mod notify;
pub mod providers;
pub mod scheduler;
pub mod schema;
pub mod stores;

pub use crate::config::Config;
pub use crate::error::{CareTrackError, Result};

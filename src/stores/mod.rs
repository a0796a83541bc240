pub mod ai_usage;
pub mod goals;
pub mod medications;
pub mod metrics;
pub mod reminders;
pub mod symptoms;
pub mod users;

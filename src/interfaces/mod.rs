pub mod providers;
pub mod scheduler;

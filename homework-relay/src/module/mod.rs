pub mod homework;
pub mod notifier;
pub mod scheduled;

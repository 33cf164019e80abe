pub mod catalog;
pub mod charts;
pub mod chat;
pub mod extraction;
pub mod pdf; // Upload → report text boundary
pub mod processor; // Report aggregator
pub mod store;

//! API endpoint handlers, one module per resource.

pub mod charts;
pub mod chat;
pub mod health;
pub mod reports;

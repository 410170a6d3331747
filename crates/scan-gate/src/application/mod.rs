//! # Application Module
//!
//! Services orchestrating the domain and outbound ports.

pub mod controller;
pub mod engine;
pub mod history;

pub use controller::ScanSessionController;
pub use engine::ScanDecisionEngine;
pub use history::{HistoryReader, HistoryView, MSG_HISTORY_FAILED};

//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits: scan stores and clocks.

mod clock;
mod faulty;
mod file;
mod memory;

pub use clock::{ManualTimeSource, SystemTimeSource};
pub use faulty::FaultInjectingStore;
pub use file::FileScanStore;
pub use memory::InMemoryScanStore;

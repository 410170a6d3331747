//! # Ports Module
//!
//! Hexagonal architecture ports.
//!
//! - **Inbound**: APIs consumed by the presentation layer
//! - **Outbound**: SPIs implemented by adapters (storage, clock)

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;

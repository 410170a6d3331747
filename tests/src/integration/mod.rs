//! Cross-component flows.

pub mod flows;

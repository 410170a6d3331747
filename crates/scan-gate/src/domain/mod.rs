//! # Domain Module
//!
//! Core scan gate types. No I/O; storage and clocks sit behind ports.

pub mod allow_list;
pub mod entities;
pub mod errors;
pub mod ledger;
pub mod session;
pub mod value_objects;

pub use allow_list::*;
pub use entities::*;
pub use errors::*;
pub use ledger::*;
pub use session::*;
pub use value_objects::*;

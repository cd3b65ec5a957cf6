//! # sigbox-core
//! Foundation types and traits for the Sigbox payment protocol.

pub mod address;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod traits;
pub mod types;

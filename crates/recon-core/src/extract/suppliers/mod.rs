//! Per-supplier extraction strategies.
//!
//! Each module implements one supplier's document layout. Every layout
//! is structurally different; a new supplier format means a new module
//! here plus a selector entry, not configuration.

pub mod apex;
pub mod brandex;
pub mod ecotrade;
pub mod jwa;
pub mod monoplaza;
pub mod taiyo;
pub mod timegate;

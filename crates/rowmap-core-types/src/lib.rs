//! Core types shared across rowmap facilities
//!
//! Holds the canonical field keys and event names used by the logging
//! facility and its test capture layer.

pub mod schema;

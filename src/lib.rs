//! REPRICER — Competitive pricing with an EBITDA margin floor
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod pricing;
pub mod sources;
pub mod gateway;
pub mod storage;

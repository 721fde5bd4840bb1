//! Test helpers module
//!
//! Fixture builders and a seeded in-memory store shared by the integration tests.

#![allow(dead_code)]

pub mod test_data;

pub use test_data::*;

//! Integration test crate for the Sable transport.
//!
//! This crate has no library code — it only contains integration tests
//! that exercise end-to-end request flows across multiple workspace crates.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p sable-integration-tests
//! ```

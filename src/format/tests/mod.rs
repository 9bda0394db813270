//! Unit tests for click file persistence.
//!
//! These tests verify structural validation on load and save/load round
//! trips through the file system.

mod roundtrip_tests;

//! avl-core-util - test-support utilities for the avl-core workspace.

pub mod fuzzer;

pub use fuzzer::Fuzzer;

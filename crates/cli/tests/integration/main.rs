//! CLI integration tests that drive full builds against a stand-in Python.

mod build_tests;
mod common;

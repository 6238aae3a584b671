//! Library-level tests that drive the public pipeline API with a scripted
//! command runner.

mod common;
mod pipeline_tests;

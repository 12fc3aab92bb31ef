//! Unit tests for the public component APIs.

mod settings_tests;
mod snapshot_tests;
mod write_queue_tests;

//! Integration tests for the shield generator

mod cleanup;
mod config_integration;
mod context_import;
mod host_protocol;

pub use test_utils::*;

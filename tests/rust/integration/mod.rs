//! Integration tests - the full parse, bind and compile path
//!
//! These tests verify that components work together correctly, including
//! catalogue and configuration files loaded from disk.

mod catalog_file_tests;
mod compile_pipeline_tests;

//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;

/// Lines of generated code that assign a step result (`name = ...`),
/// skipping comments and display calls.
pub fn assignments(code: &str) -> Vec<String> {
    code.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#') && line.contains(" = "))
        .filter(|line| !line.contains(".data = "))
        .map(str::to_string)
        .collect()
}

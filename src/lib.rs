//! Math Agent library exports for the binary and integration tests

pub mod core;
pub mod inference;
pub mod repl;
pub mod web;

#[cfg(test)]
pub mod test_support;

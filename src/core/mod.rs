//! Policy core: statements, matching and restriction evaluation.
//!
//! Nothing in here signs or verifies tokens; the core only consumes decoded
//! attributes through [`iam::DataContext`].

pub mod config;
pub mod error;
pub mod iam;

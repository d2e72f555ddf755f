//! Test harness for grid storage parts.
//!
//! Provides a fluent bench for rendering named parts against a kernel,
//! verifying them at every step and exporting meshes for inspection.
//!
//! # Key Components
//!
//! - [`PartBench`] Fluent API for rendering and checking parts
//! - [`oracle`] Verification functions returning pass/fail verdicts
//! - [`fixtures`] A catalogue of representative part specs
//! - [`helpers`] Error type, tracing setup, mesh math
//! - [`assertions`] Assertion helpers with diagnostics

pub mod assertions;
pub mod fixtures;
pub mod helpers;
pub mod oracle;
pub mod workflow;

pub use helpers::{init_tracing, HarnessError};
pub use oracle::OracleVerdict;
pub use workflow::PartBench;

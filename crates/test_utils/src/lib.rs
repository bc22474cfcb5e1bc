//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! Open CRM Core test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data for tenants, companies and statements
//! - `builders`: Builder patterns for action requests and vitals reports
//! - `gateway`: A scripted in-process `CompletionPort`
//! - `assertions`: Assertion helpers for response envelopes and ratings
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod gateway;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use gateway::*;
pub use assertions::*;
pub use generators::*;

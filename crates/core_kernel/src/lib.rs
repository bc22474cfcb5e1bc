//! Core Kernel - Foundational types shared by every CRM crate
//!
//! This crate provides the building blocks used across the domain and
//! infrastructure layers:
//! - Strongly-typed identifiers for tenants, users, requests and mutations
//! - Port error and health-check abstractions for external collaborators

pub mod identifiers;
pub mod ports;

pub use identifiers::{TenantId, UserId, RequestId, MutationId};
pub use ports::{
    PortError, DomainPort, AdapterHealth, HealthCheckResult, HealthCheckable,
    CircuitBreakerConfig,
};

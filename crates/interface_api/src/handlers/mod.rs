//! Request handlers

pub mod functions;
pub mod health;
pub mod vitals;

//! Request and response bodies

pub mod functions;
pub mod vitals;

//! Request handlers, one module per resource.

pub mod employees;
pub mod machines;
pub mod transfer;

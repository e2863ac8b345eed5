//! Shared value types: addresses, nano amounts and their errors

pub mod address;
pub mod errors;
pub mod fixed_point;

//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Rate limiter: reject early
//! 2. Access log: method, path, status, latency

pub mod audit;
pub mod rate;

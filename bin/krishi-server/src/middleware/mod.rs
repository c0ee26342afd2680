//! HTTP middleware stack.

pub mod cors;
pub mod error_detail;
pub mod trace;

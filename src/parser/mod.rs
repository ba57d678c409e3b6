//! Response line scanning.

pub mod cops_scan;
pub mod cursor;

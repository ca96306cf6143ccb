//! Crypto backend implementations
pub mod aws_lc;

pub mod adapter;
pub mod common;

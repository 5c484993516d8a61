//! Type system for rule conditions

pub mod value;

pub use value::Value;

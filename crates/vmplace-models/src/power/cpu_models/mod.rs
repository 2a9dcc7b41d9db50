//! CPU power curves.

pub mod constant;
pub mod linear;

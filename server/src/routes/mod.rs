//! HTTP route handlers

pub mod diseases;
pub mod health;
pub mod predict;

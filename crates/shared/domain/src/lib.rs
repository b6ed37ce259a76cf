//! # Domain Models
//!
//! This crate contains pure domain types with a single dependency (`serde`).
//! Keep it lean: no I/O, no browser bindings, no async. Just data and simple helpers.

pub mod config;
pub mod constants;
pub mod widget;

//! JSON endpoints.

pub mod catalog;

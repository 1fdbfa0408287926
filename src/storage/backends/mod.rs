//! Storage backends
//!
//! - `file`: one JSON document on local disk
//! - `blob`: one JSON object in an object store (HTTP / Redis / memory)
//! - `relational`: one row per record via SeaORM

pub mod blob;
pub mod file;
pub mod relational;

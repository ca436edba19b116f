//! Domain model shared by the WriteCue crates.

pub mod model;

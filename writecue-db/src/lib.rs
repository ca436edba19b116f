//! Postgres storage for WriteCue.

pub mod client;
mod ports;
mod record;

//! Card analyzer backend.
//!
//! Stores extraction output for uploaded credit card images as validated card
//! records in SQLite, and serves filtered listings and CSV exports over HTTP.

pub mod blob;
pub mod config;
pub mod pipeline;
pub mod services;
pub mod state;

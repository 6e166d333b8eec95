//! Interview API Library Crate
//!
//! This library contains the web service around `interview-core`: the
//! application state, API handlers and models, and routing. The `api` binary
//! is a thin wrapper around this library.

pub mod audio_utils;
pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;

//! Adventure TUI - terminal client for the Dungeons & Adventures game server
//!
//! The game rules live on the server. This crate renders screens, turns key
//! presses into actions, and calls the server's JSON API.

pub mod action;
pub mod api;
pub mod components;
pub mod config;
pub mod creation;
pub mod effect;
pub mod reducer;
pub mod state;
pub mod telemetry;

//! Event definitions exchanged with the session collaborator.
//!
//! This module contains both client->core and core->client event types.

mod client;
mod server;

pub use client::*;
pub use server::*;

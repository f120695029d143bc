//! Method channel that exposes the WiFi scan service to a UI process
//!
//! Calls are decoded into a closed [`Method`] enum and always answered with
//! a reply, never a panic. The server speaks newline-delimited JSON.

mod dispatch;
mod method;
mod server;

pub use method::Method;
pub use server::{call_once, serve};

//! Native WLAN API backend

mod handle;
mod listener;
mod permission;
mod scanning;

pub use permission::LocationGate;
pub use scanning::WlanRadio;

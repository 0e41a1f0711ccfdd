//! Shared wire types for the Remora print bridge.
//!
//! These types are shared between the bridge client and the daemon side
//! (real daemon or in-process test double), for framed TCP/TLS and
//! in-memory communication.

pub mod job;
pub mod message;

pub use job::{JobConfig, PrintProfile, Units};
pub use message::{BridgeMessage, EventType, FrameError, PROTOCOL_VERSION};

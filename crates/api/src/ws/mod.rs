//! WebSocket subscription surface.
//!
//! Each connection subscribes to one session's update stream on the
//! `SyncHub` and receives every `StageUpdate` as a JSON text frame.

mod handler;

pub use handler::stage_ws_handler;

//! Inbound frame dispatch
//!
//! Clients speak the same `{event, data}` envelope as the server. The only
//! event acted on is `status_updated`, which is relayed verbatim into the
//! sender's own room.

use shared::message::{EventType, WsMessage};

use crate::hub::{ConnId, NotificationHub, RoomKey};

/// What happened to one inbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Relayed to this many connections
    Relayed(usize),
    /// Well-formed but not an event clients may send
    Ignored,
    /// Not a valid envelope
    Malformed,
}

pub fn dispatch(hub: &NotificationHub, conn: ConnId, own_room: &RoomKey, text: &str) -> Dispatch {
    let message = match WsMessage::from_text(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(conn = %conn, error = %e, "Malformed inbound frame ignored");
            return Dispatch::Malformed;
        }
    };

    match message.event_type() {
        Some(EventType::StatusUpdated) => {
            let delivered = hub.relay_to_room(own_room, text);
            tracing::debug!(conn = %conn, room = %own_room, delivered, "Relayed status_updated");
            Dispatch::Relayed(delivered)
        }
        _ => {
            tracing::debug!(conn = %conn, event = %message.event, "Unhandled inbound event");
            Dispatch::Ignored
        }
    }
}

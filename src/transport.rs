//! The seam between the table logic and whatever carries bytes between peers.

use kings_shared::Identity;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transport is closed")]
    Closed,
    #[error("send failed: {0}")]
    Send(String),
}

/// Reliable, ordered broadcast to every other member of the session.
pub trait Transport {
    fn publish(&mut self, payload: Vec<u8>) -> Result<(), TransportError>;
}

/// Something the transport observed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    /// A payload from another member. `from` is the transport's own
    /// attribution, when it provides one.
    Message {
        from: Option<Identity>,
        payload: Vec<u8>,
    },
    PeerJoined(Identity),
    PeerLeft(Identity),
    /// The local session ended.
    Disconnected,
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn publish(&mut self, payload: Vec<u8>) -> Result<(), TransportError> {
        (**self).publish(payload)
    }
}

//! Room handle and input-processing options.
//!
//! The room is a transport-level grouping of participants and media streams
//! owned by the external real-time communication framework. This handle only
//! covers the signaling join; media flows never pass through this crate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::SessionError;

/// Input-processing options applied when a session binds to a room.
#[derive(Debug, Clone)]
pub struct RoomInputOptions {
    pub noise_cancellation: bool,
}

impl Default for RoomInputOptions {
    fn default() -> Self {
        Self {
            noise_cancellation: true,
        }
    }
}

/// Transport seam for the room join handshake.
#[async_trait]
pub trait RoomTransport: Send + Sync {
    /// Perform the signaling join. Called at most once per room.
    async fn connect(&self) -> Result<(), SessionError>;

    /// Tear down the signaling connection.
    async fn close(&self);
}

/// Handle to one room, created per assigned job.
pub struct Room {
    name: String,
    transport: Arc<dyn RoomTransport>,
    connected: AtomicBool,
}

impl Room {
    pub fn new(name: impl Into<String>, transport: Arc<dyn RoomTransport>) -> Self {
        Self {
            name: name.into(),
            transport,
            connected: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Connect to the room. Idempotent: a no-op when already connected.
    pub async fn connect(&self) -> Result<(), SessionError> {
        if self.connected.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        match self.transport.connect().await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.connected.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    /// Close the room's signaling connection.
    pub async fn close(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            self.transport.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct CountingTransport {
        connects: AtomicUsize,
        fail_first: AtomicBool,
    }

    impl CountingTransport {
        fn new(fail_first: bool) -> Self {
            Self {
                connects: AtomicUsize::new(0),
                fail_first: AtomicBool::new(fail_first),
            }
        }
    }

    #[async_trait]
    impl RoomTransport for CountingTransport {
        async fn connect(&self) -> Result<(), SessionError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            if self.fail_first.swap(false, Ordering::SeqCst) {
                return Err(SessionError::RoomConnect("refused".into()));
            }
            Ok(())
        }

        async fn close(&self) {}
    }

    #[tokio::test]
    async fn test_connect_is_idempotent() {
        let transport = Arc::new(CountingTransport::new(false));
        let room = Room::new("room-42", transport.clone());

        room.connect().await.unwrap();
        room.connect().await.unwrap();

        assert!(room.is_connected());
        assert_eq!(transport.connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_connect_can_be_retried() {
        let transport = Arc::new(CountingTransport::new(true));
        let room = Room::new("room-42", transport.clone());

        assert!(room.connect().await.is_err());
        assert!(!room.is_connected());

        room.connect().await.unwrap();
        assert!(room.is_connected());
        assert_eq!(transport.connects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_room_name() {
        let room = Room::new("room-42", Arc::new(CountingTransport::new(false)));
        assert_eq!(room.name(), "room-42");
    }
}

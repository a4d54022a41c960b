//! Seam to the hosted speech-to-speech model.
//!
//! Implementations handle the specifics of each provider's streaming API
//! while maintaining a consistent interface. The stream's own lifecycle
//! (reconnect, backoff) belongs to the provider; a failure surfaces as a
//! [`SessionEvent::Error`](crate::realtime::events::SessionEvent) followed
//! by `Closed`.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::agent::persona::Persona;
use crate::errors::SessionError;
use crate::realtime::events::SessionEvent;
use crate::realtime::room::RoomInputOptions;

/// A hosted realtime model that can open conversation sessions.
#[async_trait]
pub trait RealtimeModel: Send + Sync {
    /// Open a persistent streaming session bound to a persona.
    async fn start(
        &self,
        persona: &Persona,
        options: &RoomInputOptions,
    ) -> Result<Box<dyn ModelSession>, SessionError>;
}

/// One live conversation stream.
#[async_trait]
pub trait ModelSession: Send {
    /// Ask the model to generate and speak a scripted reply.
    async fn generate_reply(&mut self, instructions: &str) -> Result<(), SessionError>;

    /// Take the session event receiver. Yields `None` after the first call.
    fn take_events(&mut self) -> Option<mpsc::Receiver<SessionEvent>>;

    /// Close the stream. Safe to call more than once.
    async fn close(&mut self);
}

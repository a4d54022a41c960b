//! Managed realtime conversation session.
//!
//! Binds a connected room and a persona to a hosted model stream. Start
//! order is fixed: connect the room (idempotent), open the model stream,
//! then issue exactly one greeting request before the event receiver is
//! released to the observer. After that the external framework drives all
//! turns; this crate only observes.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::agent::persona::Persona;
use crate::errors::SessionError;
use crate::prompt::script::GREETING_INSTRUCTIONS;
use crate::realtime::events::SessionEvent;
use crate::realtime::model::{ModelSession, RealtimeModel};
use crate::realtime::room::{Room, RoomInputOptions};

/// One managed, bidirectional realtime conversation.
pub struct AgentSession {
    room_name: String,
    model_session: Box<dyn ModelSession>,
    events: Option<mpsc::Receiver<SessionEvent>>,
}

impl std::fmt::Debug for AgentSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentSession")
            .field("room_name", &self.room_name)
            .field("has_events", &self.events.is_some())
            .finish()
    }
}

impl AgentSession {
    /// Start a session: connect the room, open the model stream bound to
    /// the persona, and greet the user.
    ///
    /// The greeting request is issued before this function returns, so no
    /// user event can be observed ahead of it.
    pub async fn start(
        room: &Room,
        persona: &Persona,
        options: RoomInputOptions,
        model: Arc<dyn RealtimeModel>,
    ) -> Result<Self, SessionError> {
        room.connect().await?;

        let mut model_session = model.start(persona, &options).await?;
        let events = model_session.take_events();

        model_session.generate_reply(GREETING_INSTRUCTIONS).await?;
        info!(room = %room.name(), "Session started, greeting requested");

        Ok(Self {
            room_name: room.name().to_string(),
            model_session,
            events,
        })
    }

    pub fn room_name(&self) -> &str {
        &self.room_name
    }

    /// Take the session event receiver. Yields `None` after the first call.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<SessionEvent>> {
        self.events.take()
    }

    /// Ask the model to generate and speak a scripted reply.
    pub async fn generate_reply(&mut self, instructions: &str) -> Result<(), SessionError> {
        self.model_session.generate_reply(instructions).await
    }

    /// Close the model stream.
    pub async fn close(&mut self) {
        self.model_session.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::testing::{RecordedCall, ScriptedModel};
    use crate::realtime::room::RoomTransport;
    use async_trait::async_trait;

    struct OkTransport;

    #[async_trait]
    impl RoomTransport for OkTransport {
        async fn connect(&self) -> Result<(), SessionError> {
            Ok(())
        }
        async fn close(&self) {}
    }

    fn persona() -> Persona {
        Persona::new("You are a tester.".into(), "m".into(), "v".into(), 0.5).unwrap()
    }

    #[tokio::test]
    async fn test_start_connects_room_and_greets_once() {
        let model = Arc::new(ScriptedModel::default());
        let room = Room::new("room-42", Arc::new(OkTransport));

        let session =
            AgentSession::start(&room, &persona(), RoomInputOptions::default(), model.clone())
                .await
                .unwrap();

        assert!(room.is_connected());
        assert_eq!(session.room_name(), "room-42");

        let calls = model.calls();
        assert_eq!(
            calls,
            vec![
                RecordedCall::Start("You are a tester.".to_string()),
                RecordedCall::GenerateReply(GREETING_INSTRUCTIONS.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_events_taken_once() {
        let model = Arc::new(ScriptedModel::default());
        let room = Room::new("room-42", Arc::new(OkTransport));

        let mut session =
            AgentSession::start(&room, &persona(), RoomInputOptions::default(), model)
                .await
                .unwrap();

        assert!(session.take_events().is_some());
        assert!(session.take_events().is_none());
    }

    #[tokio::test]
    async fn test_model_start_failure_propagates() {
        let model = Arc::new(ScriptedModel::failing());
        let room = Room::new("room-42", Arc::new(OkTransport));

        let err = AgentSession::start(&room, &persona(), RoomInputOptions::default(), model)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::ModelConnect(_)));
    }
}

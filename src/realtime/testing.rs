//! Scripted doubles for exercising session flows without a live provider.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::agent::persona::Persona;
use crate::errors::SessionError;
use crate::realtime::events::SessionEvent;
use crate::realtime::model::{ModelSession, RealtimeModel};
use crate::realtime::room::{RoomInputOptions, RoomTransport};

/// One call made against a [`ScriptedModel`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    /// `start` was called with these persona instructions.
    Start(String),
    GenerateReply(String),
    Close,
}

/// A realtime model double that records calls and replays scripted events.
#[derive(Default)]
pub struct ScriptedModel {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    events: Mutex<Vec<SessionEvent>>,
    fail_start: bool,
}

impl ScriptedModel {
    /// A model whose `start` always fails.
    pub fn failing() -> Self {
        Self {
            fail_start: true,
            ..Default::default()
        }
    }

    /// Queue an event to be delivered once a session starts.
    pub fn push_event(&self, event: SessionEvent) {
        self.events.lock().unwrap().push(event);
    }

    /// Calls recorded so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RealtimeModel for ScriptedModel {
    async fn start(
        &self,
        persona: &Persona,
        _options: &RoomInputOptions,
    ) -> Result<Box<dyn ModelSession>, SessionError> {
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall::Start(persona.instructions.clone()));
        if self.fail_start {
            return Err(SessionError::ModelConnect("scripted failure".into()));
        }

        let scripted: Vec<SessionEvent> = self.events.lock().unwrap().drain(..).collect();
        let (tx, rx) = mpsc::channel(scripted.len() + 2);
        for event in scripted {
            let _ = tx.try_send(event);
        }
        let _ = tx.try_send(SessionEvent::Closed);

        Ok(Box::new(ScriptedSession {
            calls: self.calls.clone(),
            events: Some(rx),
        }))
    }
}

struct ScriptedSession {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    events: Option<mpsc::Receiver<SessionEvent>>,
}

#[async_trait]
impl ModelSession for ScriptedSession {
    async fn generate_reply(&mut self, instructions: &str) -> Result<(), SessionError> {
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall::GenerateReply(instructions.to_string()));
        Ok(())
    }

    fn take_events(&mut self) -> Option<mpsc::Receiver<SessionEvent>> {
        self.events.take()
    }

    async fn close(&mut self) {
        self.calls.lock().unwrap().push(RecordedCall::Close);
    }
}

/// A room transport that always succeeds.
pub struct StaticTransport;

#[async_trait]
impl RoomTransport for StaticTransport {
    async fn connect(&self) -> Result<(), SessionError> {
        Ok(())
    }

    async fn close(&self) {}
}

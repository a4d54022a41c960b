//! WebSocket adapter for the hosted Gemini Live realtime API.
//!
//! One setup frame carries the persona (model, voice, temperature, system
//! instructions); after the handshake the server streams conversation
//! content which is decoded into [`SessionEvent`]s. This adapter owns no
//! reconnect policy: when the stream drops, the session is over.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info};

use crate::agent::persona::Persona;
use crate::errors::SessionError;
use crate::realtime::events::{AudioFrame, ContentPart, ConversationItem, Role, SessionEvent};
use crate::realtime::model::{ModelSession, RealtimeModel};
use crate::realtime::room::RoomInputOptions;

const DEFAULT_ENDPOINT: &str = "wss://generativelanguage.googleapis.com/ws/\
google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent";

/// Sample rate of audio frames in server content.
const OUTPUT_SAMPLE_RATE: u32 = 24_000;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Client for Gemini Live streaming sessions.
pub struct GeminiLiveModel {
    api_key: String,
    endpoint: String,
}

impl GeminiLiveModel {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Override the endpoint (used against local stand-ins).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn setup_frame(&self, persona: &Persona) -> Value {
        json!({
            "setup": {
                "model": format!("models/{}", persona.model),
                "generationConfig": {
                    "temperature": persona.temperature,
                    "responseModalities": ["AUDIO"],
                    "speechConfig": {
                        "voiceConfig": {
                            "prebuiltVoiceConfig": {"voiceName": persona.voice}
                        }
                    }
                },
                "systemInstruction": {"parts": [{"text": persona.instructions}]},
                "outputAudioTranscription": {},
                "inputAudioTranscription": {}
            }
        })
    }
}

#[async_trait]
impl RealtimeModel for GeminiLiveModel {
    async fn start(
        &self,
        persona: &Persona,
        options: &RoomInputOptions,
    ) -> Result<Box<dyn ModelSession>, SessionError> {
        // Input filtering (noise cancellation) is applied on the room's media
        // path, upstream of this stream.
        debug!(
            noise_cancellation = options.noise_cancellation,
            "Opening realtime model stream"
        );

        let url = format!("{}?key={}", self.endpoint, self.api_key);
        let (ws_stream, _) = tokio_tungstenite::connect_async(&url)
            .await
            .map_err(|e| SessionError::ModelConnect(e.to_string()))?;

        let (mut sink, mut stream) = ws_stream.split();

        sink.send(Message::Text(self.setup_frame(persona).to_string()))
            .await
            .map_err(|e| SessionError::Handshake(e.to_string()))?;

        // The first server frame acknowledges the setup.
        let ack = stream
            .next()
            .await
            .ok_or_else(|| SessionError::Handshake("stream closed during setup".into()))?
            .map_err(|e| SessionError::Handshake(e.to_string()))?;
        let ack_json = message_json(&ack)
            .ok_or_else(|| SessionError::Handshake("non-JSON setup response".into()))?;
        if ack_json.get("setupComplete").is_none() {
            return Err(SessionError::Handshake(format!(
                "unexpected setup response: {ack_json}"
            )));
        }
        info!(model = %persona.model, voice = %persona.voice, "Realtime model session established");

        let (event_tx, event_rx) = mpsc::channel::<SessionEvent>(64);
        let closed = Arc::new(AtomicBool::new(false));
        let reader_closed = closed.clone();

        tokio::spawn(async move {
            let mut turn = TurnAccumulator::default();
            while let Some(msg) = stream.next().await {
                match msg {
                    Ok(Message::Close(_)) => break,
                    Ok(msg) => {
                        let Some(value) = message_json(&msg) else {
                            continue;
                        };
                        for event in decode_server_message(&value, &mut turn) {
                            if event_tx.send(event).await.is_err() {
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        if !reader_closed.load(Ordering::SeqCst) {
                            error!("Realtime stream error: {}", e);
                            let _ = event_tx.send(SessionEvent::Error(e.to_string())).await;
                        }
                        break;
                    }
                }
            }
            let _ = event_tx.send(SessionEvent::Closed).await;
        });

        Ok(Box::new(GeminiSession {
            sink,
            events: Some(event_rx),
            closed,
        }))
    }
}

/// One live Gemini stream.
struct GeminiSession {
    sink: WsSink,
    events: Option<mpsc::Receiver<SessionEvent>>,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl ModelSession for GeminiSession {
    async fn generate_reply(&mut self, instructions: &str) -> Result<(), SessionError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SessionError::Closed);
        }
        let frame = json!({
            "clientContent": {
                "turns": [{"role": "user", "parts": [{"text": instructions}]}],
                "turnComplete": true
            }
        });
        self.sink
            .send(Message::Text(frame.to_string()))
            .await
            .map_err(|e| SessionError::Stream(e.to_string()))
    }

    fn take_events(&mut self) -> Option<mpsc::Receiver<SessionEvent>> {
        self.events.take()
    }

    async fn close(&mut self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            let _ = self.sink.send(Message::Close(None)).await;
        }
    }
}

/// Parse a websocket message as JSON. The server sends JSON in both text and
/// binary frames.
fn message_json(msg: &Message) -> Option<Value> {
    match msg {
        Message::Text(text) => serde_json::from_str(text).ok(),
        Message::Binary(data) => serde_json::from_slice(data).ok(),
        _ => None,
    }
}

/// In-flight state of the agent turn currently being streamed.
#[derive(Default)]
struct TurnAccumulator {
    text: String,
    transcript: String,
    frames: Vec<AudioFrame>,
}

impl TurnAccumulator {
    fn is_empty(&self) -> bool {
        self.text.is_empty() && self.transcript.is_empty() && self.frames.is_empty()
    }

    fn into_item(self, interrupted: bool) -> ConversationItem {
        let text = if self.text.is_empty() {
            self.transcript.clone()
        } else {
            self.text.clone()
        };
        let mut item = ConversationItem::new(Role::Agent, text);
        item.interrupted = interrupted;
        if !self.text.is_empty() {
            item.content.push(ContentPart::Text { text: self.text });
        }
        let transcript = if self.transcript.is_empty() {
            None
        } else {
            Some(self.transcript)
        };
        for (i, frame) in self.frames.into_iter().enumerate() {
            // The transcript covers the whole turn; attach it to the first frame.
            item.content.push(ContentPart::Audio {
                frame,
                transcript: if i == 0 { transcript.clone() } else { None },
            });
        }
        item
    }
}

/// Decode one server message, updating the in-flight turn and returning any
/// completed conversation events.
fn decode_server_message(value: &Value, turn: &mut TurnAccumulator) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    let Some(content) = value.get("serverContent") else {
        return events;
    };

    // User speech transcription arrives as its own message.
    if let Some(text) = content
        .pointer("/inputTranscription/text")
        .and_then(Value::as_str)
    {
        let mut item = ConversationItem::new(Role::User, text);
        item.content.push(ContentPart::Text { text: text.into() });
        events.push(SessionEvent::ConversationItemAdded(item));
    }

    if let Some(text) = content
        .pointer("/outputTranscription/text")
        .and_then(Value::as_str)
    {
        turn.transcript.push_str(text);
    }

    if let Some(parts) = content.pointer("/modelTurn/parts").and_then(Value::as_array) {
        for part in parts {
            if let Some(text) = part.get("text").and_then(Value::as_str) {
                turn.text.push_str(text);
            }
            if let Some(data) = part.pointer("/inlineData/data").and_then(Value::as_str) {
                if let Ok(bytes) = base64::engine::general_purpose::STANDARD.decode(data) {
                    turn.frames.push(AudioFrame {
                        data: bytes,
                        sample_rate: OUTPUT_SAMPLE_RATE,
                        channels: 1,
                    });
                }
            }
        }
    }

    let interrupted = content
        .get("interrupted")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let turn_complete = content
        .get("turnComplete")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if (turn_complete || interrupted) && !turn.is_empty() {
        let finished = std::mem::take(turn);
        events.push(SessionEvent::ConversationItemAdded(
            finished.into_item(interrupted),
        ));
    }

    events
}

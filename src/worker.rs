//! Long-running worker process.
//!
//! The worker registers with the room server over WebSocket and receives
//! job assignments, one per room. Each assignment spawns an independent
//! job task running the agent entrypoint; a job failure is logged and
//! marked failed without taking the worker down.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::{Mutex, Notify};
use tokio_tungstenite::tungstenite::Message;
use tracing::{error, info, warn};

use crate::agent::{entrypoint, JobContext};
use crate::config::Config;
use crate::errors::SessionError;
use crate::realtime::room::{Room, RoomTransport};

/// One job assignment received from the room server.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobAssignment {
    pub room_name: String,
    pub join_token: String,
}

/// Parse a job-assignment frame. Returns `None` for any other frame type.
pub fn parse_assignment(text: &str) -> Option<JobAssignment> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    if value.get("type").and_then(|v| v.as_str()) != Some("job") {
        return None;
    }
    serde_json::from_value(value).ok()
}

/// The worker process: registers once, then dispatches assignments until
/// shutdown.
pub struct Worker {
    config: Arc<Config>,
    shutdown: Arc<Notify>,
}

impl Worker {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Handle for requesting shutdown from another task.
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        self.shutdown.clone()
    }

    /// Run the worker until the room server closes the connection or
    /// shutdown is requested.
    pub async fn run(&self) -> anyhow::Result<()> {
        let url = format!("{}/agent", self.config.worker.server_url);
        let (ws_stream, _) = tokio_tungstenite::connect_async(&url).await?;
        let (mut sink, mut stream) = ws_stream.split();

        let register = json!({
            "type": "register",
            "agentName": self.config.worker.agent_name,
            "apiKey": self.config.worker.api_key,
        });
        sink.send(Message::Text(register.to_string())).await?;
        info!(server = %self.config.worker.server_url, "Worker registered, waiting for jobs");

        loop {
            tokio::select! {
                msg = stream.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if let Some(assignment) = parse_assignment(&text) {
                                self.dispatch(assignment);
                            } else {
                                warn!("Ignoring unrecognized frame from room server");
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            sink.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!("Room server closed the connection");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            error!("Worker stream error: {}", e);
                            break;
                        }
                    }
                }
                _ = self.shutdown.notified() => {
                    info!("Worker shutting down");
                    break;
                }
            }
        }
        Ok(())
    }

    /// Spawn one job task for an assignment.
    fn dispatch(&self, assignment: JobAssignment) {
        let config = self.config.clone();
        let job_id = uuid::Uuid::new_v4();
        info!(room = %assignment.room_name, %job_id, "Job assigned");

        tokio::spawn(async move {
            let transport = Arc::new(SignalingTransport::new(
                &config.worker.server_url,
                &assignment.room_name,
                &assignment.join_token,
            ));
            let room = Room::new(assignment.room_name.clone(), transport);
            let ctx = JobContext::new(room);

            if let Err(e) = entrypoint(ctx, &config).await {
                error!(room = %assignment.room_name, %job_id, "Job failed: {:#}", e);
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Signaling transport
// ---------------------------------------------------------------------------

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Room join over the room server's signaling endpoint.
///
/// Media never flows here; the socket only establishes presence and is torn
/// down when the job ends.
pub struct SignalingTransport {
    url: String,
    socket: Mutex<Option<WsStream>>,
}

impl SignalingTransport {
    pub fn new(server_url: &str, room_name: &str, join_token: &str) -> Self {
        Self {
            url: format!("{server_url}/rtc?room={room_name}&access_token={join_token}"),
            socket: Mutex::new(None),
        }
    }
}

#[async_trait::async_trait]
impl RoomTransport for SignalingTransport {
    async fn connect(&self) -> Result<(), SessionError> {
        let (ws_stream, _) = tokio_tungstenite::connect_async(&self.url)
            .await
            .map_err(|e| SessionError::RoomConnect(e.to_string()))?;
        *self.socket.lock().await = Some(ws_stream);
        Ok(())
    }

    async fn close(&self) {
        if let Some(mut ws) = self.socket.lock().await.take() {
            let _ = ws.close(None).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        let frame = r#"{"type":"job","roomName":"room-42","joinToken":"tok"}"#;
        let assignment = parse_assignment(frame).unwrap();
        assert_eq!(assignment.room_name, "room-42");
        assert_eq!(assignment.join_token, "tok");
    }

    #[test]
    fn test_parse_assignment_rejects_other_frames() {
        assert!(parse_assignment(r#"{"type":"pong"}"#).is_none());
        assert!(parse_assignment("not json").is_none());
        // Right type, missing fields.
        assert!(parse_assignment(r#"{"type":"job","roomName":"x"}"#).is_none());
    }

    #[test]
    fn test_signaling_transport_url() {
        let t = SignalingTransport::new("ws://localhost:7880", "room-42", "tok");
        assert_eq!(
            t.url,
            "ws://localhost:7880/rtc?room=room-42&access_token=tok"
        );
    }

    #[test]
    fn test_worker_shutdown_handle_is_shared() {
        let worker = Worker::new(Config::default());
        let handle = worker.shutdown_handle();
        assert!(Arc::ptr_eq(&handle, &worker.shutdown));
    }
}

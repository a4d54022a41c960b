//! Agent job entrypoint.
//!
//! One job = one room. The flow is fixed: connect the room, resolve the
//! interview script, build the persona, start the session (which greets the
//! user), then observe conversation events until the stream ends. Any
//! failure before session start aborts the job; the worker marks it failed.

pub mod observer;
pub mod persona;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::prompt::PromptSource;
use crate::realtime::model::RealtimeModel;
use crate::realtime::room::{Room, RoomInputOptions};
use crate::realtime::session::AgentSession;

use persona::Persona;

/// Context handed to the entrypoint for one assigned job.
pub struct JobContext {
    pub room: Room,
}

impl JobContext {
    pub fn new(room: Room) -> Self {
        Self { room }
    }
}

/// Run one interview job to completion.
///
/// The model is injected so the flow can be exercised against scripted
/// doubles; `entrypoint` wires the real provider.
pub async fn run_job(
    ctx: JobContext,
    config: &Config,
    model: Arc<dyn RealtimeModel>,
) -> Result<()> {
    let room_name = ctx.room.name().to_string();

    ctx.room
        .connect()
        .await
        .with_context(|| format!("connecting to room {room_name}"))?;

    let prompt_source = PromptSource::from_config(&config.prompt);
    let script = prompt_source
        .resolve(&room_name)
        .await
        .with_context(|| format!("resolving interview script for room {room_name}"))?;

    let persona = Persona::from_script(&script, &config.model)?;
    info!(room = %room_name, model = %persona.model, "Persona ready");

    let options = RoomInputOptions {
        noise_cancellation: config.room.noise_cancellation,
    };

    let mut session = AgentSession::start(&ctx.room, &persona, options, model).await?;

    let events = session
        .take_events()
        .context("session event stream already taken")?;
    let observer = observer::spawn_observer(room_name.clone(), events);

    // The external framework drives all subsequent turns; the job lives
    // until the stream ends.
    observer.await.ok();
    session.close().await;
    ctx.room.close().await;
    info!(room = %room_name, "Job finished");
    Ok(())
}

/// Production entrypoint: binds the configured hosted model.
pub async fn entrypoint(ctx: JobContext, config: &Config) -> Result<()> {
    let model = Arc::new(crate::realtime::gemini::GeminiLiveModel::new(
        config.model.api_key.clone(),
    ));
    run_job(ctx, config, model).await
}

//! Realtime session support: room handle, model seam, and the managed
//! conversation session.
//!
//! The heavy lifting (audio transport, codecs, turn-taking, inference) is
//! delegated to the hosted framework; this module owns only the lifecycle
//! glue and the event types it emits.

pub mod events;
pub mod gemini;
pub mod model;
pub mod room;
pub mod session;
pub mod testing;

pub use events::{AudioFrame, ContentPart, ConversationItem, Role, SessionEvent};
pub use gemini::GeminiLiveModel;
pub use model::{ModelSession, RealtimeModel};
pub use room::{Room, RoomInputOptions, RoomTransport};
pub use session::AgentSession;

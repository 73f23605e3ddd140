//! Observable conversation state.

use std::fmt;

use recomendify_types::message::PrivateMessage;
use recomendify_types::peer::ConversationPeer;
use serde::Serialize;

use super::timeline::Timeline;

/// Shown when the conversation history cannot be loaded.
pub const LOAD_ERROR_NOTICE: &str = "Erro ao carregar mensagens.";

/// Shown when a message to a human peer cannot be stored.
pub const SEND_ERROR_NOTICE: &str = "Erro ao enviar mensagem.";

/// Shown when the bot endpoint fails.
pub const BOT_ERROR_NOTICE: &str = "Erro ao obter resposta do bot.";

/// Bot reply used when the endpoint answers without text.
pub const BOT_FALLBACK_REPLY: &str = "Desculpe, não entendi. Pode perguntar novamente?";

/// Lifecycle of the active conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No peer selected.
    Idle,
    /// History is being fetched.
    Loading,
    Ready,
    /// The history fetch failed; live updates are off.
    Error,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Loading => write!(f, "loading"),
            Phase::Ready => write!(f, "ready"),
            Phase::Error => write!(f, "error"),
        }
    }
}

/// Point-in-time copy of everything a view renders.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSnapshot {
    pub peer: Option<ConversationPeer>,
    pub phase: Phase,
    pub messages: Vec<PrivateMessage>,
    /// User-facing error notice, cleared by the next send or reload.
    pub error: Option<String>,
    pub sending: bool,
    pub draft: String,
}

/// Result of a send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank text; nothing was sent.
    Ignored,
    /// Stored for a human peer. The row shows up in the timeline when the
    /// live channel echoes it back.
    Delivered(PrivateMessage),
    /// Bot round trip completed.
    Answered {
        question: PrivateMessage,
        reply: PrivateMessage,
    },
}

/// Mutable state behind the engine's lock.
#[derive(Debug)]
pub(crate) struct ConversationState {
    /// Bumped whenever the active conversation changes. Async completions
    /// carry the generation they started under and are dropped if stale.
    pub(crate) generation: u64,
    pub(crate) peer: Option<ConversationPeer>,
    pub(crate) phase: Phase,
    pub(crate) timeline: Timeline,
    pub(crate) error: Option<String>,
    pub(crate) draft: String,
}

impl ConversationState {
    pub(crate) fn new() -> Self {
        Self {
            generation: 0,
            peer: None,
            phase: Phase::Idle,
            timeline: Timeline::new(),
            error: None,
            draft: String::new(),
        }
    }

    /// Switch to `peer` (or to no peer) and return the new generation.
    pub(crate) fn begin(&mut self, peer: Option<ConversationPeer>) -> u64 {
        self.generation += 1;
        self.phase = if peer.is_some() {
            Phase::Loading
        } else {
            Phase::Idle
        };
        self.peer = peer;
        self.timeline.clear();
        self.error = None;
        self.generation
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }
}

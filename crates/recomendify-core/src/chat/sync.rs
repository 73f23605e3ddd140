//! The conversation sync engine.
//!
//! `ConversationSync` keeps one ordered, deduplicated message sequence for
//! the selected peer and reconciles three sources into it:
//!
//! - the history fetch (human peers) or the local bot history (bot peer),
//! - row changes pushed over the conversation's live channel,
//! - local writes of the bot conversation.
//!
//! Every async completion carries the generation it started under. Switching
//! peers bumps the generation, so late results for an abandoned peer are
//! dropped instead of leaking into the new conversation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use recomendify_types::change::{PRIVATE_MESSAGES_TABLE, RowChange};
use recomendify_types::error::{BotError, SyncError};
use recomendify_types::message::{NewMessage, PrivateMessage};
use recomendify_types::peer::ConversationPeer;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use super::channel::channel_name;
use super::guard::{SendingGuard, SubscriptionGuard};
use super::state::{
    BOT_ERROR_NOTICE, BOT_FALLBACK_REPLY, ConversationSnapshot, ConversationState,
    LOAD_ERROR_NOTICE, Phase, SEND_ERROR_NOTICE, SendOutcome,
};
use crate::bot::BotResponder;
use crate::realtime::{ChangeReceiver, LiveChannel};
use crate::repository::MessageStore;
use crate::storage::{BotHistory, LocalStorage};

/// Default upper bound for one bot round trip.
pub const DEFAULT_BOT_TIMEOUT: Duration = Duration::from_secs(60);

/// Tunables of the engine.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub bot_timeout: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            bot_timeout: DEFAULT_BOT_TIMEOUT,
        }
    }
}

/// State shared with the listener task.
struct Shared {
    state: Mutex<ConversationState>,
    revision: watch::Sender<u64>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ConversationState> {
        self.state.lock().expect("conversation state lock poisoned")
    }

    fn notify(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    /// Merge a pushed row if it belongs to the pair and the conversation is
    /// still the one the listener was started for.
    fn apply_change(&self, change: &RowChange, user_id: &str, peer_id: &str, generation: u64) {
        if change.table != PRIVATE_MESSAGES_TABLE {
            return;
        }
        let Some(row) = change.new.as_ref() else {
            return;
        };
        if !row.is_between(user_id, peer_id) {
            return;
        }
        let merged = {
            let mut state = self.lock();
            state.is_current(generation) && state.timeline.merge(row.clone())
        };
        if merged {
            debug!(message_id = %row.id, kind = ?change.kind, "live message merged");
            self.notify();
        }
    }
}

/// Sync engine for the conversation between the current user and one peer.
///
/// All methods take `&self`; the engine can be shared behind an `Arc` between
/// an input loop and a renderer. Dropping the engine releases its live
/// subscription.
pub struct ConversationSync<S, B, L> {
    store: S,
    bot: B,
    history: BotHistory<L>,
    current_user_id: String,
    options: SyncOptions,
    shared: Arc<Shared>,
    subscription: Mutex<Option<SubscriptionGuard>>,
    sending: AtomicBool,
}

impl<S, B, L> ConversationSync<S, B, L>
where
    S: MessageStore,
    B: BotResponder,
    L: LocalStorage,
{
    pub fn new(
        store: S,
        bot: B,
        local_storage: L,
        current_user_id: impl Into<String>,
        options: SyncOptions,
    ) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            store,
            bot,
            history: BotHistory::new(local_storage),
            current_user_id: current_user_id.into(),
            options,
            shared: Arc::new(Shared {
                state: Mutex::new(ConversationState::new()),
                revision,
            }),
            subscription: Mutex::new(None),
            sending: AtomicBool::new(false),
        }
    }

    pub fn current_user_id(&self) -> &str {
        &self.current_user_id
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Open the conversation with `peer`.
    ///
    /// No-op if `peer` is already the active conversation (same id and kind)
    /// and it did not fail to load. Otherwise the previous subscription is
    /// released, the timeline emptied and the conversation loaded.
    pub async fn initialize(&self, peer: ConversationPeer) -> Result<(), SyncError> {
        {
            let state = self.shared.lock();
            if state.phase != Phase::Error
                && state
                    .peer
                    .as_ref()
                    .is_some_and(|active| active.same_conversation(&peer))
            {
                debug!(peer_id = %peer.id, "conversation already active");
                return Ok(());
            }
        }
        let generation = self.switch_to(Some(peer.clone()));
        self.load(peer, generation).await
    }

    /// Load the active conversation again from scratch.
    pub async fn reload(&self) -> Result<(), SyncError> {
        let peer = self.shared.lock().peer.clone().ok_or(SyncError::NoPeer)?;
        let generation = self.switch_to(Some(peer.clone()));
        self.load(peer, generation).await
    }

    /// Leave the active conversation and release its subscription.
    pub fn close(&self) {
        self.switch_to(None);
    }

    fn switch_to(&self, peer: Option<ConversationPeer>) -> u64 {
        let mut subscription = self.lock_subscription();
        let generation = self.shared.lock().begin(peer);
        let previous = subscription.take();
        drop(subscription);
        drop(previous);
        debug!(generation, "conversation switched");
        self.shared.notify();
        generation
    }

    async fn load(&self, peer: ConversationPeer, generation: u64) -> Result<(), SyncError> {
        if peer.is_bot {
            return self.load_bot_history(generation).await;
        }

        // Subscribe first: a row inserted while the fetch is in flight then
        // arrives over the channel and the merge absorbs the overlap.
        let channel = channel_name(&self.current_user_id, &peer.id);
        match self.store.subscribe(&channel).await {
            Ok(live) => self.attach(live, &peer.id, generation),
            Err(e) => warn!(%channel, error = %e, "live updates unavailable"),
        }

        let fetched = self
            .store
            .fetch_conversation(&self.current_user_id, &peer.id)
            .await;

        let mut state = self.shared.lock();
        if !state.is_current(generation) {
            drop(state);
            debug!(peer_id = %peer.id, generation, "discarding stale history");
            return Ok(());
        }
        match fetched {
            Ok(rows) => {
                let added = state.timeline.extend_merged(rows);
                state.phase = Phase::Ready;
                drop(state);
                info!(peer_id = %peer.id, added, "conversation loaded");
                self.shared.notify();
                Ok(())
            }
            Err(e) => {
                state.timeline.clear();
                state.phase = Phase::Error;
                state.error = Some(LOAD_ERROR_NOTICE.to_string());
                drop(state);
                warn!(peer_id = %peer.id, error = %e, "failed to load conversation");
                self.release_subscription(generation);
                self.shared.notify();
                Err(SyncError::Fetch(e))
            }
        }
    }

    async fn load_bot_history(&self, generation: u64) -> Result<(), SyncError> {
        let loaded = self.history.load().await;

        let mut state = self.shared.lock();
        if !state.is_current(generation) {
            return Ok(());
        }
        let result = match loaded {
            Ok(messages) => {
                state.timeline.extend_merged(messages);
                state.phase = Phase::Ready;
                Ok(())
            }
            Err(e) => {
                state.phase = Phase::Error;
                state.error = Some(LOAD_ERROR_NOTICE.to_string());
                Err(SyncError::History(e))
            }
        };
        let count = state.timeline.len();
        drop(state);
        debug!(count, "bot history loaded");
        self.shared.notify();
        result
    }

    /// Install `live` as the conversation's subscription if `generation` is
    /// still current; otherwise drop it.
    fn attach(&self, live: LiveChannel, peer_id: &str, generation: u64) {
        let mut subscription = self.lock_subscription();
        if !self.shared.lock().is_current(generation) {
            debug!(channel = %live.name(), "dropping subscription for stale conversation");
            return;
        }
        let (lease, receiver) = live.split();
        let cancel = CancellationToken::new();
        let listener = tokio::spawn(listen(
            Arc::clone(&self.shared),
            receiver,
            self.current_user_id.clone(),
            peer_id.to_string(),
            generation,
            cancel.clone(),
        ));
        info!(channel = %lease.name(), "subscribed to live channel");
        *subscription = Some(SubscriptionGuard::new(lease, cancel, listener));
    }

    fn release_subscription(&self, generation: u64) {
        let mut subscription = self.lock_subscription();
        if self.shared.lock().is_current(generation) {
            subscription.take();
        }
    }

    fn lock_subscription(&self) -> MutexGuard<'_, Option<SubscriptionGuard>> {
        self.subscription
            .lock()
            .expect("subscription lock poisoned")
    }

    // -----------------------------------------------------------------------
    // Compose and send
    // -----------------------------------------------------------------------

    pub fn set_draft(&self, text: impl Into<String>) {
        self.shared.lock().draft = text.into();
        self.shared.notify();
    }

    pub fn draft(&self) -> String {
        self.shared.lock().draft.clone()
    }

    /// Put `text` in the compose box and send it.
    pub async fn send_text(&self, text: &str) -> Result<SendOutcome, SyncError> {
        self.set_draft(text);
        self.send().await
    }

    /// Send the compose box to the active peer.
    ///
    /// Blank text is ignored. Only one send runs at a time; an overlapping
    /// call fails with `SyncError::SendInFlight`.
    pub async fn send(&self) -> Result<SendOutcome, SyncError> {
        let (peer, generation, text) = {
            let state = self.shared.lock();
            let peer = state.peer.clone().ok_or(SyncError::NoPeer)?;
            (peer, state.generation, state.draft.clone())
        };
        if text.trim().is_empty() {
            return Ok(SendOutcome::Ignored);
        }

        let _sending = SendingGuard::acquire(&self.sending, || self.shared.notify())
            .ok_or(SyncError::SendInFlight)?;
        self.shared.lock().error = None;
        self.shared.notify();

        if peer.is_bot {
            self.ask_bot(&peer, generation, text).await
        } else {
            self.deliver(&peer, generation, text).await
        }
    }

    /// Human peer: store the row. The timeline picks it up from the live
    /// channel, like every other session of both participants.
    async fn deliver(
        &self,
        peer: &ConversationPeer,
        generation: u64,
        text: String,
    ) -> Result<SendOutcome, SyncError> {
        let message = NewMessage {
            sender_id: self.current_user_id.clone(),
            receiver_id: peer.id.clone(),
            content: text.clone(),
        };
        match self.store.insert_message(&message).await {
            Ok(row) => {
                {
                    let mut state = self.shared.lock();
                    if state.draft == text {
                        state.draft.clear();
                    }
                }
                self.shared.notify();
                info!(peer_id = %peer.id, message_id = %row.id, "message stored");
                Ok(SendOutcome::Delivered(row))
            }
            Err(e) => {
                {
                    let mut state = self.shared.lock();
                    if state.is_current(generation) {
                        state.error = Some(SEND_ERROR_NOTICE.to_string());
                    }
                }
                self.shared.notify();
                warn!(peer_id = %peer.id, error = %e, "failed to store message");
                Err(SyncError::Send(e))
            }
        }
    }

    /// Bot peer: append the question locally, ask the bot, append the answer.
    async fn ask_bot(
        &self,
        peer: &ConversationPeer,
        generation: u64,
        text: String,
    ) -> Result<SendOutcome, SyncError> {
        let question = PrivateMessage::local(&self.current_user_id, &peer.id, &text);
        {
            let mut state = self.shared.lock();
            if !state.is_current(generation) {
                return Ok(SendOutcome::Ignored);
            }
            state.timeline.push_local(question.clone());
            if state.draft == text {
                state.draft.clear();
            }
        }
        self.shared.notify();
        if let Err(e) = self.history.append(question.clone()).await {
            warn!(error = %e, "failed to persist bot history");
        }

        let span = info_span!("bot.respond", peer_id = %peer.id, prompt_len = text.len());
        let answer = match tokio::time::timeout(self.options.bot_timeout, self.bot.respond(&text))
            .instrument(span)
            .await
        {
            Ok(result) => result,
            Err(_) => Err(BotError::Timeout(self.options.bot_timeout)),
        };

        let reply = match answer {
            Ok(reply) => reply,
            Err(e) => {
                {
                    let mut state = self.shared.lock();
                    if state.is_current(generation) {
                        state.error = Some(BOT_ERROR_NOTICE.to_string());
                    }
                }
                self.shared.notify();
                warn!(error = %e, "bot did not answer");
                return Err(SyncError::Bot(e));
            }
        };

        let content = reply.non_blank().unwrap_or(BOT_FALLBACK_REPLY);
        let answer = PrivateMessage::bot_reply(&peer.id, &self.current_user_id, content);
        self.record_bot_reply(answer.clone()).await;
        Ok(SendOutcome::Answered {
            question,
            reply: answer,
        })
    }

    /// Add a bot reply to the bot conversation.
    ///
    /// The reply is always appended to the stored history. If the bot
    /// conversation is open, or being reopened, it also joins the timeline;
    /// a reload racing with the reply merges by id, so neither copy is lost.
    async fn record_bot_reply(&self, reply: PrivateMessage) {
        let shown = {
            let mut state = self.shared.lock();
            let bot_open = state.peer.as_ref().is_some_and(|p| p.is_bot)
                && matches!(state.phase, Phase::Loading | Phase::Ready);
            bot_open && state.timeline.push_local(reply.clone())
        };
        if shown {
            self.shared.notify();
        } else {
            debug!(message_id = %reply.id, "bot conversation closed, storing reply only");
        }
        if let Err(e) = self.history.append(reply).await {
            warn!(error = %e, "failed to persist bot history");
        }
    }

    /// Delete the stored bot conversation and empty it on screen if open.
    pub async fn clear_bot_history(&self) -> Result<(), SyncError> {
        self.history.clear().await.map_err(SyncError::History)?;
        let cleared = {
            let mut state = self.shared.lock();
            if state.peer.as_ref().is_some_and(|p| p.is_bot) {
                state.timeline.clear();
                true
            } else {
                false
            }
        };
        if cleared {
            self.shared.notify();
        }
        info!("bot history cleared");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    pub fn snapshot(&self) -> ConversationSnapshot {
        let state = self.shared.lock();
        ConversationSnapshot {
            peer: state.peer.clone(),
            phase: state.phase,
            messages: state.timeline.to_vec(),
            error: state.error.clone(),
            sending: self.sending.load(Ordering::Acquire),
            draft: state.draft.clone(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.shared.lock().phase
    }

    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    /// Revision counter bumped on every state change.
    pub fn updates(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    /// Name of the live channel currently held, if any.
    pub fn active_channel(&self) -> Option<String> {
        self.lock_subscription()
            .as_ref()
            .map(|guard| guard.channel().to_string())
    }
}

async fn listen(
    shared: Arc<Shared>,
    mut receiver: ChangeReceiver,
    user_id: String,
    peer_id: String,
    generation: u64,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            change = receiver.recv() => match change {
                Some(change) => shared.apply_change(&change, &user_id, &peer_id, generation),
                None => {
                    debug!(%peer_id, "change feed closed");
                    break;
                }
            },
        }
    }
}

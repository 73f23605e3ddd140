//! In-memory port implementations shared by this crate's tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use recomendify_types::bot::BotReply;
use recomendify_types::error::{BotError, StorageError, StoreError};
use recomendify_types::message::{NewMessage, PrivateMessage};
use tokio::sync::Notify;

use crate::bot::BotResponder;
use crate::realtime::{ChangeFeed, LiveChannel};
use crate::repository::MessageStore;
use crate::storage::LocalStorage;

/// `LocalStorage` over a shared map. Clones see the same data.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryStorage {
    items: Arc<Mutex<BTreeMap<String, String>>>,
}

impl LocalStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.lock().unwrap().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.lock().unwrap().remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.items.lock().unwrap().keys().cloned().collect())
    }
}

/// `MemoryStorage` whose next read can be held after the value is taken,
/// so the caller sees a snapshot that later writes do not change.
#[derive(Debug, Clone, Default)]
pub(crate) struct GatedStorage {
    inner: MemoryStorage,
    held: Arc<Mutex<Option<Arc<Notify>>>>,
    reads: Arc<AtomicUsize>,
}

impl GatedStorage {
    /// Hold the next `get_item` until the returned `Notify` fires.
    pub(crate) fn hold_next_read(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.held.lock().unwrap() = Some(Arc::clone(&notify));
        notify
    }

    pub(crate) fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl LocalStorage for GatedStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self.inner.get_item(key).await?;
        let gate = self.held.lock().unwrap().take();
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(value)
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set_item(key, value).await
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove_item(key).await
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.inner.keys().await
    }
}

/// `MessageStore` over a vector of rows.
///
/// Inserts are stored but not echoed on the feed; tests publish echoes
/// themselves through `feed`.
#[derive(Debug, Default)]
pub(crate) struct MockStore {
    pub(crate) feed: ChangeFeed,
    rows: Mutex<Vec<PrivateMessage>>,
    held: Mutex<HashMap<String, Arc<Notify>>>,
    next_id: AtomicUsize,
    pub(crate) fail_fetch: AtomicBool,
    pub(crate) fail_insert: AtomicBool,
    pub(crate) fail_subscribe: AtomicBool,
    pub(crate) fetches: AtomicUsize,
}

impl MockStore {
    pub(crate) fn with_rows(rows: Vec<PrivateMessage>) -> Self {
        let store = Self::default();
        *store.rows.lock().unwrap() = rows;
        store
    }

    /// Make fetches for `peer_id` wait until the returned `Notify` fires.
    pub(crate) fn hold_fetch(&self, peer_id: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.held
            .lock()
            .unwrap()
            .insert(peer_id.to_string(), Arc::clone(&notify));
        notify
    }

    pub(crate) fn stored(&self) -> Vec<PrivateMessage> {
        self.rows.lock().unwrap().clone()
    }
}

impl MessageStore for MockStore {
    async fn fetch_conversation(
        &self,
        user_id: &str,
        peer_id: &str,
    ) -> Result<Vec<PrivateMessage>, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let gate = self.held.lock().unwrap().get(peer_id).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(StoreError::Connection("connection refused".into()));
        }
        let mut rows: Vec<PrivateMessage> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.is_between(user_id, peer_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    async fn insert_message(&self, message: &NewMessage) -> Result<PrivateMessage, StoreError> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(StoreError::Query("insert rejected".into()));
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let row = PrivateMessage {
            id: format!("row-{n}"),
            sender_id: message.sender_id.clone(),
            receiver_id: message.receiver_id.clone(),
            content: message.content.clone(),
            created_at: Utc::now(),
            read: false,
            is_bot: false,
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn subscribe(&self, channel: &str) -> Result<LiveChannel, StoreError> {
        if self.fail_subscribe.load(Ordering::SeqCst) {
            return Err(StoreError::Subscription("realtime unavailable".into()));
        }
        Ok(self.feed.subscribe(channel))
    }
}

#[derive(Debug, Clone)]
enum Script {
    Reply(Option<String>),
    Fail,
    Hang,
}

/// `BotResponder` with a fixed answer and an optional gate.
#[derive(Debug)]
pub(crate) struct ScriptedBot {
    script: Script,
    gate: Option<Arc<Notify>>,
    pub(crate) prompts: Mutex<Vec<String>>,
}

impl ScriptedBot {
    fn new(script: Script) -> Self {
        Self {
            script,
            gate: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn replying(text: &str) -> Self {
        Self::new(Script::Reply(Some(text.to_string())))
    }

    pub(crate) fn silent() -> Self {
        Self::new(Script::Reply(None))
    }

    pub(crate) fn failing() -> Self {
        Self::new(Script::Fail)
    }

    pub(crate) fn hanging() -> Self {
        Self::new(Script::Hang)
    }

    /// Answer only after `gate` fires.
    pub(crate) fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }
}

impl BotResponder for ScriptedBot {
    async fn respond(&self, prompt: &str) -> Result<BotReply, BotError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.script {
            Script::Reply(text) => Ok(BotReply {
                generated_text: text.clone(),
            }),
            Script::Fail => Err(BotError::Status {
                status: 500,
                body: "{\"error\":\"boom\"}".into(),
            }),
            Script::Hang => std::future::pending().await,
        }
    }
}

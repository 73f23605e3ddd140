//! Conversation sync engine and port traits for Recomendify private chat.
//!
//! This crate defines the "ports" (store, storage, bot, and session traits)
//! that the infrastructure layer implements, plus the engine that merges
//! history and live changes into one conversation. It depends only on
//! `recomendify-types` -- never on `recomendify-infra` or any database/IO crate.

pub mod auth;
pub mod bot;
pub mod chat;
pub mod realtime;
pub mod repository;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;

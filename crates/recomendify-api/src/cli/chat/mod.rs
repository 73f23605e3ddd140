//! Interactive CLI chat.
//!
//! Entry point: `loop_runner::run_chat_loop`. Input is read with
//! rustyline-async while a render task prints rows as they arrive on the
//! live channel.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod render;

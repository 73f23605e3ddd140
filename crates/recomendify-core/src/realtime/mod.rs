//! In-process realtime fan-out of message row changes.

pub mod feed;

pub use feed::{ChangeFeed, ChangeReceiver, ChannelLease, LiveChannel};

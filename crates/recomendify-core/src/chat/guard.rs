//! RAII guards for the in-flight send flag and the live subscription.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::realtime::ChannelLease;

/// Holds the `sending` flag for the duration of one send.
///
/// The flag is cleared on drop, so every exit path releases it.
pub(crate) struct SendingGuard<'a> {
    flag: &'a AtomicBool,
    on_release: Box<dyn Fn() + Send + Sync + 'a>,
}

impl<'a> SendingGuard<'a> {
    /// Set the flag, or return `None` if another send already holds it.
    pub(crate) fn acquire(
        flag: &'a AtomicBool,
        on_release: impl Fn() + Send + Sync + 'a,
    ) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(Self {
            flag,
            on_release: Box::new(on_release),
        })
    }
}

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
        (self.on_release)();
    }
}

/// The one live subscription of the active conversation.
///
/// Dropping it stops the listener task and releases the channel.
#[derive(Debug)]
pub(crate) struct SubscriptionGuard {
    lease: ChannelLease,
    cancel: CancellationToken,
    listener: JoinHandle<()>,
}

impl SubscriptionGuard {
    pub(crate) fn new(lease: ChannelLease, cancel: CancellationToken, listener: JoinHandle<()>) -> Self {
        Self {
            lease,
            cancel,
            listener,
        }
    }

    pub(crate) fn channel(&self) -> &str {
        self.lease.name()
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.listener.abort();
        debug!(channel = %self.lease.name(), "subscription released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn second_acquire_fails_until_release() {
        let flag = AtomicBool::new(false);
        let releases = AtomicUsize::new(0);

        let guard = SendingGuard::acquire(&flag, || {
            releases.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        assert!(flag.load(Ordering::SeqCst));
        assert!(SendingGuard::acquire(&flag, || {}).is_none());

        drop(guard);
        assert!(!flag.load(Ordering::SeqCst));
        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert!(SendingGuard::acquire(&flag, || {}).is_some());
    }

    #[test]
    fn flag_cleared_on_early_return() {
        fn fails(flag: &AtomicBool) -> Result<(), &'static str> {
            let _guard = SendingGuard::acquire(flag, || {}).ok_or("busy")?;
            Err("boom")
        }

        let flag = AtomicBool::new(false);
        assert_eq!(fails(&flag), Err("boom"));
        assert!(!flag.load(Ordering::SeqCst));
    }
}

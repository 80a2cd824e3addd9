//! One-way cancellation flag. This is how it works:
//!
//! 1. [`pair`] creates a connected ([`Canceller`], [`CancelToken`]) couple.
//! 2. The orchestrator keeps the [`Canceller`] and hands a clone of the
//!    [`CancelToken`] to each worker.
//! 3. Workers poll [`CancelToken::is_cancelled`] at their loop checkpoints
//!    and race [`CancelToken::cancelled`] against blocking waits.
//!
//! The flag only ever moves from `false` to `true`. Once set it stays set
//! for the rest of the process lifetime, so a worker that observed it can
//! never be asked to resume.

use tokio::sync::watch;

/// Requests cancellation of every task holding a matching [`CancelToken`].
pub struct Canceller {
    /// Sender half of the flag channel.
    sender: watch::Sender<bool>,
}

/// Observer half of the cancellation flag. Cheap to clone, one per worker.
#[derive(Clone)]
pub struct CancelToken {
    /// Receiver half of the flag channel.
    receiver: watch::Receiver<bool>,
}

/// Creates a connected canceller/token couple with the flag unset.
pub fn pair() -> (Canceller, CancelToken) {
    let (sender, receiver) = watch::channel(false);

    (Canceller { sender }, CancelToken { receiver })
}

impl Canceller {
    /// Sets the flag. Calling this more than once is allowed and has no
    /// further effect, the flag never goes back to `false`.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }
}

impl CancelToken {
    /// Non-blocking checkpoint read.
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Completes once the flag is set. If the [`Canceller`] is dropped
    /// without ever cancelling, the flag can no longer change and this
    /// future stays pending forever.
    pub async fn cancelled(&mut self) {
        // wait_for only fails when the Canceller is dropped, and a dropped
        // Canceller can never set the flag anymore.
        let closed = self.receiver.wait_for(|cancelled| *cancelled).await.is_err();

        if closed {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[test]
    fn flag_is_one_way() {
        let (canceller, token) = pair();

        assert!(!token.is_cancelled());

        canceller.cancel();
        assert!(token.is_cancelled());
        assert!(canceller.is_cancelled());

        // Second cancel is a no-op, the flag must stay set.
        canceller.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn clones_observe_the_same_flag() {
        let (canceller, token) = pair();
        let clone = token.clone();

        canceller.cancel();

        assert!(token.is_cancelled());
        assert!(clone.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_resolves_after_cancel() {
        let (canceller, mut token) = pair();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        timeout(Duration::from_secs(1), token.cancelled())
            .await
            .expect("cancellation was requested but never observed");
    }

    #[tokio::test]
    async fn cancelled_stays_pending_when_canceller_is_dropped() {
        let (canceller, mut token) = pair();
        drop(canceller);

        let result = timeout(Duration::from_millis(50), token.cancelled()).await;

        assert!(result.is_err());
        assert!(!token.is_cancelled());
    }
}

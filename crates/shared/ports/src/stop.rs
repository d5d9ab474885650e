use tokio::sync::watch;

/// Owner side of a cooperative shutdown flag
///
/// Actors hold [`StopToken`]s; raising the signal wakes every task blocked in
/// `acquire`, `swap`, `lend` or a pause so it can abandon the wait.
#[derive(Debug)]
pub struct StopSignal {
    tx: watch::Sender<bool>,
}

impl StopSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Hand out a token observing this signal
    pub fn token(&self) -> StopToken {
        StopToken {
            rx: self.tx.subscribe(),
        }
    }

    /// Raise the signal. Idempotent.
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer side of a [`StopSignal`]
#[derive(Debug, Clone)]
pub struct StopToken {
    rx: watch::Receiver<bool>,
}

impl StopToken {
    /// Resolves once the signal is raised.
    ///
    /// If the signal is dropped without being raised this never resolves.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_stop_wakes_waiting_token() {
        let signal = StopSignal::new();
        let token = signal.token();
        assert!(!token.is_cancelled());

        let waiter = tokio::spawn(async move { token.cancelled().await });
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        signal.stop();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("token should observe stop")
            .unwrap();
        assert!(signal.is_stopped());
    }

    #[tokio::test]
    async fn test_token_created_after_stop_is_cancelled() {
        let signal = StopSignal::new();
        signal.stop();
        let token = signal.token();
        assert!(token.is_cancelled());
        token.cancelled().await;
    }

    #[tokio::test]
    async fn test_dropped_signal_never_cancels() {
        let token = StopSignal::new().token();
        let result = tokio::time::timeout(Duration::from_millis(20), token.cancelled()).await;
        assert!(result.is_err());
        assert!(!token.is_cancelled());
    }
}

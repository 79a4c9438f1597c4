use {
    crate::infra::{config::ConfirmationConfig, observe},
    neo_model::TxHash,
    neo_rpc::NodeRpc,
    std::{sync::Arc, time::Duration},
    thiserror::Error,
    tokio::time::Instant,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("transactions {pending:?} not included after {timeout:?}")]
    ConfirmationTimeout {
        pending: Vec<TxHash>,
        timeout: Duration,
    },
    #[error("node unavailable: {0}")]
    NodeUnavailable(#[from] neo_rpc::Error),
}

/// Waits for submitted transactions to be included in a block.
pub struct Confirmation {
    rpc: Arc<dyn NodeRpc>,
    config: ConfirmationConfig,
}

impl Confirmation {
    pub fn new(rpc: Arc<dyn NodeRpc>, config: ConfirmationConfig) -> Self {
        Self { rpc, config }
    }

    /// Polls the node until every transaction is included. Returns
    /// immediately when there is nothing to wait for.
    pub async fn wait(&self, hashes: &[TxHash]) -> Result<(), Error> {
        if hashes.is_empty() {
            return Ok(());
        }
        let ConfirmationConfig {
            timeout,
            poll_interval,
        } = self.config;
        observe::waiting_for_confirmation(hashes.len(), timeout);

        let deadline = Instant::now() + timeout;
        let mut pending = hashes.to_vec();
        loop {
            let mut still_pending = Vec::new();
            for hash in pending {
                match self.rpc.transaction_height(hash).await? {
                    Some(height) => observe::confirmed(hash, height),
                    None => {
                        observe::pending(hash);
                        still_pending.push(hash);
                    }
                }
            }
            pending = still_pending;
            if pending.is_empty() {
                return Ok(());
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(Error::ConfirmationTimeout { pending, timeout });
            }
            tokio::time::sleep(poll_interval.min(deadline - now)).await;
        }
    }
}

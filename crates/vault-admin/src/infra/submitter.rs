//! Fee estimation, signing and broadcasting of admin transactions.
//!
//! Both fees are always estimated, including in dry-run mode, so that a
//! misconfigured call surfaces before anything is broadcast. Nothing is
//! retried: a failed submission aborts the run and is resubmitted by the
//! operator.

use {
    crate::infra::{
        blockchain::{self, FeeEstimating},
        observe,
    },
    neo_model::{Account, SignError, Transaction, TxHash},
    neo_rpc::NodeRpc,
    std::sync::Arc,
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("fee estimation failed: {0}")]
    Fee(#[source] blockchain::Error),
    #[error("signing failed: {0}")]
    Signing(#[from] SignError),
    #[error("broadcast failed: {0}")]
    Broadcast(#[source] neo_rpc::Error),
}

pub struct Submitter {
    rpc: Arc<dyn NodeRpc>,
    fees: Arc<dyn FeeEstimating>,
    owner: Arc<Account>,
    network_magic: u32,
    dry_run: bool,
}

impl Submitter {
    pub fn new(
        rpc: Arc<dyn NodeRpc>,
        fees: Arc<dyn FeeEstimating>,
        owner: Arc<Account>,
        network_magic: u32,
        dry_run: bool,
    ) -> Self {
        Self {
            rpc,
            fees,
            owner,
            network_magic,
            dry_run,
        }
    }

    pub fn owner(&self) -> &Account {
        &self.owner
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Estimates the fees of the transaction and, unless this is a dry run,
    /// signs and broadcasts it. Returns the hash of the broadcast
    /// transaction, `None` in dry-run mode.
    pub async fn submit(
        &self,
        mut transaction: Transaction,
        description: &str,
    ) -> Result<Option<TxHash>, Error> {
        let network_fee = self
            .fees
            .network_fee(&transaction)
            .await
            .map_err(Error::Fee)?;
        transaction.set_network_fee(network_fee);
        observe::network_fee(description, network_fee);

        let system_fee = self
            .fees
            .system_fee(&transaction)
            .await
            .map_err(Error::Fee)?;
        transaction.set_system_fee(system_fee);
        observe::system_fee(description, system_fee);

        if self.dry_run {
            observe::not_submitting(description);
            return Ok(None);
        }

        observe::submitting(description);
        let signed = transaction.sign(&self.owner, self.network_magic)?;
        let hash = self
            .rpc
            .send_raw_transaction(&signed.to_bytes())
            .await
            .map_err(Error::Broadcast)?;
        if hash != signed.hash() {
            observe::unexpected_hash(description, signed.hash(), hash);
        }
        observe::submitted(description, hash);
        Ok(Some(hash))
    }
}

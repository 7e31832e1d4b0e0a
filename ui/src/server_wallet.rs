//! The [`TipWallet`] used by the app: every call goes through the fullstack
//! server functions, which forward to the node.

use std::time::Duration;

use api::contract::TipConfig;
use api::wallet::ConnectionStatus;
use api::wallet::PrepareError;
use api::wallet::TipArgs;
use api::wallet::TipWallet;
use api::wallet::TxDescriptor;
use api::wallet::TxError;
use api::wallet::TxHash;
use api::wallet::TxOutcome;
use dioxus_logger::tracing::warn;

use crate::compat;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ServerWallet {
    poll_interval: Duration,
    max_polls: u32,
}

impl ServerWallet {
    pub fn new(config: &TipConfig) -> Self {
        Self {
            poll_interval: config.receipt_poll_interval(),
            max_polls: config.receipt_max_polls,
        }
    }
}

impl TipWallet for ServerWallet {
    async fn connection_status(&self) -> ConnectionStatus {
        match api::wallet_status().await {
            Ok(status) => status,
            Err(e) => {
                warn!("wallet status unavailable: {}", e);
                ConnectionStatus::Disconnected
            }
        }
    }

    async fn prepare_transaction(&self, args: &TipArgs) -> Result<TxDescriptor, PrepareError> {
        api::prepare_tip(args.clone())
            .await
            .unwrap_or_else(|e| Err(PrepareError::new(e.to_string())))
    }

    async fn submit_transaction(&self, tx: &TxDescriptor) -> Result<TxHash, TxError> {
        api::submit_tip(tx.clone())
            .await
            .unwrap_or_else(|e| Err(TxError::new(e.to_string())))
    }

    /// Polls for the receipt until it shows up or the poll budget runs out.
    /// Transport errors while polling are logged and retried.
    async fn watch_transaction(&self, hash: &TxHash) -> Result<TxOutcome, TxError> {
        for _ in 0..self.max_polls {
            match api::tip_receipt(*hash).await {
                Ok(Some(outcome)) => return Ok(outcome),
                Ok(None) => {}
                Err(e) => warn!("receipt for {} unavailable: {}", hash, e),
            }
            compat::sleep(self.poll_interval).await;
        }
        Err(TxError::new("Timed out waiting for confirmation"))
    }
}

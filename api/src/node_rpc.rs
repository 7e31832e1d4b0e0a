//! Client for the Ethereum node that holds the signing account.

use alloy_network::ReceiptResponse;
use alloy_network::TransactionBuilder;
use alloy_primitives::Bytes;
use alloy_provider::Provider;
use alloy_provider::ProviderBuilder;
use alloy_provider::RootProvider;
use alloy_rpc_types_eth::TransactionRequest;
use alloy_transport::TransportError;
use thiserror::Error;
use url::Url;

use crate::wallet::Address;
use crate::wallet::TxHash;
use crate::wallet::TxOutcome;

const DEFAULT_URL: &str = "http://127.0.0.1:8545";

#[derive(Error, Debug)]
pub enum NodeRpcError {
    #[error("invalid node url {url}: {source}")]
    Url {
        url: String,
        source: url::ParseError,
    },
    #[error("node request failed: {0}")]
    Transport(TransportError),
    /// The node answered with a JSON-RPC error object.
    #[error("{message} (code {code})")]
    Rpc {
        code: i64,
        message: String,
        /// Raw revert payload, when the error came from a reverted call.
        revert_data: Option<Bytes>,
    },
}

impl From<TransportError> for NodeRpcError {
    fn from(e: TransportError) -> Self {
        match e.as_error_resp() {
            Some(payload) => Self::Rpc {
                code: payload.code,
                message: payload.message.to_string(),
                revert_data: payload.as_revert_data(),
            },
            None => Self::Transport(e),
        }
    }
}

pub struct NodeClient {
    provider: RootProvider,
}

impl NodeClient {
    /// Connects to `ETH_RPC_URL`, defaulting to a local dev node.
    pub fn from_env() -> Result<Self, NodeRpcError> {
        let url = std::env::var("ETH_RPC_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        let parsed = url
            .parse::<Url>()
            .map_err(|source| NodeRpcError::Url { url, source })?;
        Ok(Self::new(parsed))
    }

    pub fn new(url: Url) -> Self {
        // The node fills nonce and fees itself for eth_sendTransaction.
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_http(url);

        Self { provider }
    }

    pub async fn chain_id(&self) -> Result<u64, NodeRpcError> {
        Ok(self.provider.get_chain_id().await?)
    }

    /// Accounts the node can sign for.
    pub async fn accounts(&self) -> Result<Vec<Address>, NodeRpcError> {
        Ok(self.provider.get_accounts().await?)
    }

    /// Simulates the call and returns its gas estimate. Reverts come back as
    /// [`NodeRpcError::Rpc`].
    pub async fn estimate_gas(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
    ) -> Result<u64, NodeRpcError> {
        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_input(data);
        Ok(self.provider.estimate_gas(tx).await?)
    }

    /// Sends through `eth_sendTransaction`, signed by the node's `from`
    /// account.
    pub async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
        gas: u64,
    ) -> Result<TxHash, NodeRpcError> {
        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_input(data)
            .with_gas_limit(gas);
        let pending = self.provider.send_transaction(tx).await?;
        Ok(*pending.tx_hash())
    }

    /// `None` until the transaction is mined.
    pub async fn transaction_outcome(
        &self,
        hash: TxHash,
    ) -> Result<Option<TxOutcome>, NodeRpcError> {
        let receipt = self.provider.get_transaction_receipt(hash).await?;
        Ok(receipt.and_then(|r| receipt_outcome(r.status(), r.block_number())))
    }
}

fn receipt_outcome(succeeded: bool, block: Option<u64>) -> Option<TxOutcome> {
    let block = block?;
    Some(if succeeded {
        TxOutcome::Confirmed { block }
    } else {
        TxOutcome::Reverted { block }
    })
}

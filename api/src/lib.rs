//! This crate contains the tip domain logic and all shared fullstack server
//! functions.

pub mod amount;
pub mod contract;
pub mod debounce;
#[cfg(not(target_arch = "wasm32"))]
mod node_rpc;
pub mod notification;
pub mod tip;
pub mod wallet;

use contract::TipConfig;
use dioxus::prelude::*;
use wallet::ConnectionStatus;
use wallet::PrepareError;
use wallet::TipArgs;
use wallet::TxDescriptor;
use wallet::TxError;
use wallet::TxHash;
use wallet::TxOutcome;

pub type ApiError = anyhow::Error;

/// Returns the contract and host-page configuration.
#[post("/api/tip_config")]
pub async fn tip_config() -> Result<TipConfig, ApiError> {
    Ok(TipConfig::from_env())
}

/// Reports whether the node has an account it can sign tips with.
#[post("/api/wallet_status")]
pub async fn wallet_status() -> Result<ConnectionStatus, ApiError> {
    let node = node_rpc::NodeClient::from_env()?;
    let status = match node.accounts().await?.into_iter().next() {
        Some(account) => ConnectionStatus::Connected(account),
        None => ConnectionStatus::Disconnected,
    };
    Ok(status)
}

/// Encodes and simulates a `tipOnPost` call.
///
/// Network and revert problems are returned as `PrepareError` values; only
/// failures to reach the node are `Err`.
#[post("/api/prepare_tip")]
pub async fn prepare_tip(args: TipArgs) -> Result<Result<TxDescriptor, PrepareError>, ApiError> {
    let config = TipConfig::from_env();
    let calldata = contract::encode_tip_call(&args);
    let node = node_rpc::NodeClient::from_env()?;

    let chain_id = node.chain_id().await?;
    if chain_id != config.chain_id {
        return Ok(Err(PrepareError::new(format!(
            "wrong network: node is on chain {chain_id}, tips live on chain {}",
            config.chain_id
        ))));
    }

    let Some(from) = node.accounts().await?.into_iter().next() else {
        return Ok(Err(PrepareError::new("no account available to sign the tip")));
    };

    match node
        .estimate_gas(from, config.contract_address, calldata.clone())
        .await
    {
        Ok(gas) => {
            dioxus_logger::tracing::info!(
                "prepared tip of {} on post {} ({} gas)",
                args.amount,
                args.post_id,
                gas
            );
            Ok(Ok(TxDescriptor {
                from,
                to: config.contract_address,
                data: calldata,
                gas,
            }))
        }
        Err(node_rpc::NodeRpcError::Rpc {
            code,
            message,
            revert_data,
        }) => {
            dioxus_logger::tracing::warn!("tip simulation failed ({}): {}", code, message);
            let revert_data = revert_data.as_ref().map(|data| &data[..]);
            let reason = contract::revert_reason(&message, revert_data);
            Ok(Err(PrepareError::with_reason(message, reason)))
        }
        Err(e) => Err(e.into()),
    }
}

/// Broadcasts a prepared tip through the node's account.
///
/// Only `tipOnPost` calls on the configured contract are signed; anything
/// else is refused with a `TxError`.
#[post("/api/submit_tip")]
pub async fn submit_tip(tx: TxDescriptor) -> Result<Result<TxHash, TxError>, ApiError> {
    let config = TipConfig::from_env();
    let calldata = match contract::authorize_submission(&tx, config.contract_address) {
        Ok(calldata) => calldata,
        Err(e) => {
            dioxus_logger::tracing::warn!("refusing to sign for {}: {}", tx.from, e);
            return Ok(Err(TxError::new(e.to_string())));
        }
    };

    let node = node_rpc::NodeClient::from_env()?;
    match node
        .send_transaction(tx.from, config.contract_address, calldata, tx.gas)
        .await
    {
        Ok(hash) => Ok(Ok(hash)),
        Err(node_rpc::NodeRpcError::Rpc { code, message, .. }) => {
            dioxus_logger::tracing::warn!("tip submission rejected ({}): {}", code, message);
            Ok(Err(TxError::new(message)))
        }
        Err(e) => Err(e.into()),
    }
}

/// Returns the outcome of a tip transaction, or `None` while it is pending.
#[post("/api/tip_receipt")]
pub async fn tip_receipt(hash: TxHash) -> Result<Option<TxOutcome>, ApiError> {
    let node = node_rpc::NodeClient::from_env()?;
    Ok(node.transaction_outcome(hash).await?)
}

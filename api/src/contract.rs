//! The tip contract: where it lives, how its call is encoded, and how its
//! revert reasons are read back.

use std::env;
use std::time::Duration;

use alloy_primitives::Bytes;
use alloy_primitives::U256;
use alloy_sol_types::sol;
use alloy_sol_types::Revert;
use alloy_sol_types::SolCall;
use alloy_sol_types::SolError;
use dioxus_logger::tracing::warn;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::wallet::Address;
use crate::wallet::PostId;
use crate::wallet::TipArgs;
use crate::wallet::TxDescriptor;

sol! {
    function tipOnPost(address recipient, uint256 amount, uint256 postId);
}

/// Why the server refuses to sign a submitted transaction.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RejectedTx {
    #[error("transaction targets {0}, not the tip contract")]
    WrongContract(Address),
    #[error("transaction is not a tipOnPost call")]
    NotATip,
}

/// Client-visible configuration for the tip widget and its host page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TipConfig {
    pub contract_address: Address,
    pub chain_id: u64,
    /// Post shown by the host page.
    pub demo_recipient: Address,
    pub demo_post_id: PostId,
    pub receipt_poll_secs: u64,
    pub receipt_max_polls: u32,
    pub toast_secs: u64,
}

impl TipConfig {
    /// Reads configuration from environment variables, with in-code defaults.
    ///
    /// # Environment Variables
    /// - `TIP_CONTRACT_ADDRESS`: address of the deployed tip contract.
    /// - `TIP_CHAIN_ID`: chain the contract is deployed on. defaults to 31337.
    /// - `TIP_DEMO_RECIPIENT`, `TIP_DEMO_POST_ID`: the post the host page shows.
    /// - `TIP_RECEIPT_POLL_SECS`: seconds between receipt polls. defaults to 2.
    /// - `TIP_RECEIPT_MAX_POLLS`: polls before giving up. defaults to 90.
    /// - `TIP_TOAST_SECS`: seconds a toast stays up. defaults to 5.
    pub fn from_env() -> Self {
        Self {
            contract_address: env_address("TIP_CONTRACT_ADDRESS"),
            chain_id: env_or("TIP_CHAIN_ID", 31337),
            demo_recipient: env_address("TIP_DEMO_RECIPIENT"),
            demo_post_id: PostId(env_or("TIP_DEMO_POST_ID", 1)),
            receipt_poll_secs: env_or("TIP_RECEIPT_POLL_SECS", 2),
            receipt_max_polls: env_or("TIP_RECEIPT_MAX_POLLS", 90),
            toast_secs: env_or("TIP_TOAST_SECS", 5),
        }
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_secs(self.receipt_poll_secs)
    }

    pub fn toast_lifetime(&self) -> Duration {
        Duration::from_secs(self.toast_secs)
    }
}

fn env_address(key: &str) -> Address {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("{} is not a valid address ({}), using the zero address", key, e);
            Address::ZERO
        }),
        Err(_) => {
            warn!("{} not set, using the zero address", key);
            Address::ZERO
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// ABI-encodes `tipOnPost(recipient, amount, postId)`.
pub fn encode_tip_call(args: &TipArgs) -> Bytes {
    tipOnPostCall {
        recipient: args.recipient,
        amount: args.amount.units(),
        postId: U256::from(args.post_id.0),
    }
    .abi_encode()
    .into()
}

/// Checks that `tx` is a `tipOnPost` call on `contract` and returns its
/// calldata, re-encoded from the decoded arguments.
pub fn authorize_submission(tx: &TxDescriptor, contract: Address) -> Result<Bytes, RejectedTx> {
    if tx.to != contract {
        return Err(RejectedTx::WrongContract(tx.to));
    }
    let call = tipOnPostCall::abi_decode(&tx.data).map_err(|_| RejectedTx::NotATip)?;
    Ok(call.abi_encode().into())
}

/// Extracts a human readable revert reason from a JSON-RPC error.
///
/// Tries the ABI-encoded `Error(string)` payload first, then the
/// `execution reverted: <reason>` message form used by most nodes.
pub fn revert_reason(message: &str, data: Option<&[u8]>) -> Option<String> {
    if let Some(revert) = data.and_then(|d| Revert::abi_decode(d).ok()) {
        return Some(revert.reason);
    }
    message
        .split_once("execution reverted:")
        .map(|(_, reason)| reason.trim().to_string())
        .filter(|reason| !reason.is_empty())
}

#[cfg(test)]
mod tests {
    use alloy_primitives::keccak256;

    use super::*;
    use crate::amount::validate;

    fn recipient() -> Address {
        "0x52908400098527886E0F7030069857D2E4169EE7".parse().unwrap()
    }

    fn args(amount: &str, post_id: u64) -> TipArgs {
        TipArgs {
            recipient: recipient(),
            amount: validate(amount).unwrap(),
            post_id: PostId(post_id),
        }
    }

    fn descriptor(to: Address, data: Bytes) -> TxDescriptor {
        TxDescriptor {
            from: Address::repeat_byte(0xb),
            to,
            data,
            gas: 50_000,
        }
    }

    #[test]
    fn encodes_tip_call_as_selector_and_three_words() {
        let calldata = encode_tip_call(&args("5", 42));

        assert_eq!(calldata.len(), 4 + 3 * 32);
        assert_eq!(
            calldata[..4],
            keccak256("tipOnPost(address,uint256,uint256)")[..4]
        );

        let recipient_word = &calldata[4..36];
        assert!(recipient_word[..12].iter().all(|b| *b == 0));
        assert_eq!(recipient_word[12..], recipient()[..]);

        assert_eq!(U256::from_be_slice(&calldata[36..68]), U256::from(5));
        assert_eq!(U256::from_be_slice(&calldata[68..]), U256::from(42));
    }

    #[test]
    fn encodes_amounts_beyond_u64() {
        let calldata = encode_tip_call(&args("18446744073709551616", 1));
        assert_eq!(
            U256::from_be_slice(&calldata[36..68]),
            U256::from(u64::MAX) + U256::from(1)
        );
    }

    #[test]
    fn authorizes_tip_calls_on_the_contract() {
        let contract = Address::repeat_byte(0xc);
        let calldata = encode_tip_call(&args("5", 42));

        assert_eq!(
            authorize_submission(&descriptor(contract, calldata.clone()), contract),
            Ok(calldata)
        );
    }

    #[test]
    fn refuses_foreign_contract() {
        let contract = Address::repeat_byte(0xc);
        let elsewhere = Address::repeat_byte(0xd);
        let tx = descriptor(elsewhere, encode_tip_call(&args("5", 42)));

        assert_eq!(
            authorize_submission(&tx, contract),
            Err(RejectedTx::WrongContract(elsewhere))
        );
    }

    #[test]
    fn refuses_other_calldata() {
        let contract = Address::repeat_byte(0xc);

        // ERC-20 transfer(address,uint256) with the same leading words.
        let mut transfer = keccak256("transfer(address,uint256)")[..4].to_vec();
        transfer.extend_from_slice(&encode_tip_call(&args("5", 42))[4..68]);

        for data in [Bytes::new(), Bytes::from(transfer)] {
            assert_eq!(
                authorize_submission(&descriptor(contract, data), contract),
                Err(RejectedTx::NotATip)
            );
        }
    }

    #[test]
    fn decodes_error_string_payload() {
        let data = Revert {
            reason: "insufficient funds".to_string(),
        }
        .abi_encode();

        assert_eq!(
            revert_reason("execution reverted", Some(data.as_slice())).as_deref(),
            Some("insufficient funds")
        );
    }

    #[test]
    fn falls_back_to_message_reason() {
        assert_eq!(
            revert_reason("execution reverted: post does not exist", None).as_deref(),
            Some("post does not exist")
        );
        assert_eq!(revert_reason("execution reverted", Some(&[][..])), None);
        assert_eq!(revert_reason("nonce too low", None), None);
    }
}

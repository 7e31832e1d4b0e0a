//! The wallet/contract service the tip widget talks to, and the values that
//! cross that seam.

use std::fmt;

use alloy_primitives::Bytes;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::amount::TipAmount;

pub use alloy_primitives::Address;
pub use alloy_primitives::TxHash;

/// `0x1234…abcd` style abbreviation of the checksummed address.
pub fn abbreviate(address: &Address) -> String {
    let s = address.to_checksum(None);
    format!("{}…{}", &s[..6], &s[s.len() - 4..])
}

/// Identifier of the tipped post on the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub u64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Arguments of one `tipOnPost` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TipArgs {
    pub recipient: Address,
    pub amount: TipAmount,
    pub post_id: PostId,
}

/// A simulated, ready-to-send transaction.
///
/// Only valid for the arguments it was prepared from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxDescriptor {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    pub gas: u64,
}

/// Final state of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::EnumIs)]
pub enum TxOutcome {
    Confirmed { block: u64 },
    Reverted { block: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum::EnumIs)]
pub enum ConnectionStatus {
    Connected(Address),
    Disconnected,
}

/// Why a transaction could not be prepared.
///
/// `reason` carries the nested cause (usually a contract revert string) when
/// the node supplied one.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct PrepareError {
    pub message: String,
    pub reason: Option<String>,
}

impl PrepareError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            reason: None,
        }
    }

    pub fn with_reason(message: impl Into<String>, reason: Option<String>) -> Self {
        Self {
            message: message.into(),
            reason,
        }
    }

    /// The most specific explanation available.
    pub fn reason(&self) -> &str {
        self.reason.as_deref().unwrap_or(&self.message)
    }
}

/// A submission or confirmation failure, reduced to a short message.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{short_message}")]
pub struct TxError {
    pub short_message: String,
}

impl TxError {
    const MAX_LEN: usize = 160;

    /// Keeps the first line of `message`, capped at a readable length.
    pub fn new(message: impl AsRef<str>) -> Self {
        let first_line = message.as_ref().lines().next().unwrap_or("").trim();
        let short_message = match first_line.char_indices().nth(Self::MAX_LEN) {
            Some((cut, _)) => format!("{}…", &first_line[..cut]),
            None => first_line.to_string(),
        };
        Self { short_message }
    }
}

/// The wallet and contract library behind the tip widget.
///
/// Implementations own connectivity, signing and chain access; the widget
/// only sequences these calls.
#[allow(async_fn_in_trait)]
pub trait TipWallet {
    async fn connection_status(&self) -> ConnectionStatus;

    /// Builds and simulates a `tipOnPost` transaction.
    async fn prepare_transaction(&self, args: &TipArgs) -> Result<TxDescriptor, PrepareError>;

    /// Broadcasts a prepared transaction.
    async fn submit_transaction(&self, tx: &TxDescriptor) -> Result<TxHash, TxError>;

    /// Resolves once the transaction is mined, or fails if it cannot be
    /// observed.
    async fn watch_transaction(&self, hash: &TxHash) -> Result<TxOutcome, TxError>;
}

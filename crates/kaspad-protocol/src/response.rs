//! Response envelope, per-operation response messages and notifications.

use serde::{Deserialize, Serialize};

use crate::error::RpcError;
use crate::model::*;

/// A message that can appear inside [`KaspadResponse`].
///
/// Lets callers pull a specific variant out of the envelope and read its
/// embedded error record without matching on the envelope by hand.
pub trait ResponseMessage: Sized {
    /// Wire tag of the envelope variant carrying this message.
    const KIND: &'static str;

    /// Embedded error record.
    fn error(&self) -> &RpcError;

    /// Take this message out of the envelope, or hand the envelope back
    /// untouched when a different variant is active.
    fn from_response(response: KaspadResponse) -> Result<Self, KaspadResponse>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetBalancesByAddressesResponse {
    pub entries: Vec<BalancesByAddressEntry>,
    pub error: RpcError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetUtxosByAddressesResponse {
    pub entries: Vec<UtxosByAddressesEntry>,
    pub error: RpcError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyUtxosChangedResponse {
    pub error: RpcError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopNotifyingUtxosChangedResponse {
    pub error: RpcError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyBlockAddedResponse {
    pub error: RpcError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitTransactionResponse {
    pub transaction_id: String,
    pub error: RpcError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitTransactionReplacementResponse {
    pub transaction_id: String,
    pub replaced_transaction: RpcTransaction,
    pub error: RpcError,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetFeeEstimateResponse {
    pub estimate: RpcFeeEstimate,
    pub error: RpcError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetMempoolEntryResponse {
    pub entry: RpcMempoolEntry,
    pub error: RpcError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetMempoolEntriesResponse {
    pub entries: Vec<RpcMempoolEntry>,
    pub error: RpcError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetMempoolEntriesByAddressesResponse {
    pub entries: Vec<RpcMempoolEntryByAddress>,
    pub error: RpcError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetCurrentNetworkResponse {
    pub current_network: String,
    pub error: RpcError,
}

/// DAG info fields sit flat next to the error record on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetBlockDagInfoResponse {
    #[serde(flatten)]
    pub info: BlockDagInfo,
    pub error: RpcError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetInfoResponse {
    #[serde(flatten)]
    pub info: NodeInfo,
    pub error: RpcError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyVirtualSelectedParentChainChangedResponse {
    pub error: RpcError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetVirtualSelectedParentBlueScoreResponse {
    pub blue_score: u64,
    pub error: RpcError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyVirtualSelectedParentBlueScoreChangedResponse {
    pub error: RpcError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyVirtualDaaScoreChangedResponse {
    pub error: RpcError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetBlockResponse {
    pub block: RpcBlock,
    pub error: RpcError,
}

/// UTXOs added to and removed from the watched addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UtxosChangedNotification {
    pub added: Vec<UtxosByAddressesEntry>,
    pub removed: Vec<UtxosByAddressesEntry>,
    pub error: RpcError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockAddedNotification {
    pub block: RpcBlock,
    pub error: RpcError,
}

/// Chain blocks removed and added by a virtual selected parent change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VirtualSelectedParentChainChangedNotification {
    pub removed_chain_block_hashes: Vec<String>,
    pub added_chain_block_hashes: Vec<String>,
    /// Only populated when the subscription asked for accepted ids.
    pub accepted_transaction_ids: Vec<RpcAcceptedTransactionIds>,
    pub error: RpcError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VirtualSelectedParentBlueScoreChangedNotification {
    pub virtual_selected_parent_blue_score: u64,
    pub error: RpcError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VirtualDaaScoreChangedNotification {
    pub virtual_daa_score: u64,
    pub error: RpcError,
}

macro_rules! response_envelope {
    ($($variant:ident($message:ty) => $tag:literal,)+) => {
        /// Response envelope: one variant per operation reply, plus one per
        /// notification kind.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub enum KaspadResponse {
            $(
                #[serde(rename = $tag)]
                $variant($message),
            )+
        }

        impl KaspadResponse {
            /// Stable variant name, matching the wire tag.
            pub fn kind(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => $tag,)+
                }
            }

            /// Error record of whichever variant is active.
            pub fn error(&self) -> &RpcError {
                match self {
                    $(Self::$variant(message) => &message.error,)+
                }
            }

            /// Replace the error record of whichever variant is active.
            pub fn with_error(mut self, error: RpcError) -> Self {
                match &mut self {
                    $(Self::$variant(message) => message.error = error,)+
                }
                self
            }
        }

        $(
            impl ResponseMessage for $message {
                const KIND: &'static str = $tag;

                fn error(&self) -> &RpcError {
                    &self.error
                }

                fn from_response(response: KaspadResponse) -> Result<Self, KaspadResponse> {
                    match response {
                        KaspadResponse::$variant(message) => Ok(message),
                        other => Err(other),
                    }
                }
            }

            impl From<$message> for KaspadResponse {
                fn from(message: $message) -> Self {
                    Self::$variant(message)
                }
            }
        )+
    };
}

response_envelope! {
    GetBalancesByAddresses(GetBalancesByAddressesResponse) => "getBalancesByAddressesResponse",
    GetUtxosByAddresses(GetUtxosByAddressesResponse) => "getUtxosByAddressesResponse",
    NotifyUtxosChanged(NotifyUtxosChangedResponse) => "notifyUtxosChangedResponse",
    StopNotifyingUtxosChanged(StopNotifyingUtxosChangedResponse) => "stopNotifyingUtxosChangedResponse",
    NotifyBlockAdded(NotifyBlockAddedResponse) => "notifyBlockAddedResponse",
    SubmitTransaction(SubmitTransactionResponse) => "submitTransactionResponse",
    SubmitTransactionReplacement(SubmitTransactionReplacementResponse) => "submitTransactionReplacementResponse",
    GetFeeEstimate(GetFeeEstimateResponse) => "getFeeEstimateResponse",
    GetMempoolEntry(GetMempoolEntryResponse) => "getMempoolEntryResponse",
    GetMempoolEntries(GetMempoolEntriesResponse) => "getMempoolEntriesResponse",
    GetMempoolEntriesByAddresses(GetMempoolEntriesByAddressesResponse) => "getMempoolEntriesByAddressesResponse",
    GetCurrentNetwork(GetCurrentNetworkResponse) => "getCurrentNetworkResponse",
    GetBlockDagInfo(GetBlockDagInfoResponse) => "getBlockDagInfoResponse",
    GetInfo(GetInfoResponse) => "getInfoResponse",
    NotifyVirtualSelectedParentChainChanged(NotifyVirtualSelectedParentChainChangedResponse) => "notifyVirtualSelectedParentChainChangedResponse",
    GetVirtualSelectedParentBlueScore(GetVirtualSelectedParentBlueScoreResponse) => "getVirtualSelectedParentBlueScoreResponse",
    NotifyVirtualSelectedParentBlueScoreChanged(NotifyVirtualSelectedParentBlueScoreChangedResponse) => "notifyVirtualSelectedParentBlueScoreChangedResponse",
    NotifyVirtualDaaScoreChanged(NotifyVirtualDaaScoreChangedResponse) => "notifyVirtualDaaScoreChangedResponse",
    GetBlock(GetBlockResponse) => "getBlockResponse",
    UtxosChangedNotification(UtxosChangedNotification) => "utxosChangedNotification",
    BlockAddedNotification(BlockAddedNotification) => "blockAddedNotification",
    VirtualSelectedParentChainChangedNotification(VirtualSelectedParentChainChangedNotification) => "virtualSelectedParentChainChangedNotification",
    VirtualSelectedParentBlueScoreChangedNotification(VirtualSelectedParentBlueScoreChangedNotification) => "virtualSelectedParentBlueScoreChangedNotification",
    VirtualDaaScoreChangedNotification(VirtualDaaScoreChangedNotification) => "virtualDaaScoreChangedNotification",
}

//! Request envelope and per-operation request messages.

use serde::{Deserialize, Serialize};

use crate::model::RpcTransaction;
use crate::response::*;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetBalancesByAddressesRequest {
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetUtxosByAddressesRequest {
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotifyUtxosChangedRequest {
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StopNotifyingUtxosChangedRequest {
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyBlockAddedRequest {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitTransactionRequest {
    pub transaction: RpcTransaction,
    pub allow_orphan: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitTransactionReplacementRequest {
    pub transaction: RpcTransaction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetFeeEstimateRequest {}

/// Look up one mempool transaction.
///
/// Both pool flags default to `true` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetMempoolEntryRequest {
    pub tx_id: String,
    pub include_orphan_pool: bool,
    pub filter_transaction_pool: bool,
}

impl Default for GetMempoolEntryRequest {
    fn default() -> Self {
        Self {
            tx_id: String::new(),
            include_orphan_pool: true,
            filter_transaction_pool: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetMempoolEntriesRequest {
    pub include_orphan_pool: bool,
    pub filter_transaction_pool: bool,
}

impl Default for GetMempoolEntriesRequest {
    fn default() -> Self {
        Self {
            include_orphan_pool: true,
            filter_transaction_pool: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetMempoolEntriesByAddressesRequest {
    pub addresses: Vec<String>,
    pub include_orphan_pool: bool,
    pub filter_transaction_pool: bool,
}

impl Default for GetMempoolEntriesByAddressesRequest {
    fn default() -> Self {
        Self {
            addresses: Vec::new(),
            include_orphan_pool: true,
            filter_transaction_pool: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetCurrentNetworkRequest {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetBlockDagInfoRequest {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetInfoRequest {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotifyVirtualSelectedParentChainChangedRequest {
    pub include_accepted_transaction_ids: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetVirtualSelectedParentBlueScoreRequest {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyVirtualSelectedParentBlueScoreChangedRequest {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyVirtualDaaScoreChangedRequest {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetBlockRequest {
    pub hash: String,
    pub include_transactions: bool,
}

/// Request envelope: exactly one operation per message.
///
/// There is no correlation id. A reply is matched to its request by the
/// exchange it arrives on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KaspadRequest {
    #[serde(rename = "getBalancesByAddressesRequest")]
    GetBalancesByAddresses(GetBalancesByAddressesRequest),
    #[serde(rename = "getUtxosByAddressesRequest")]
    GetUtxosByAddresses(GetUtxosByAddressesRequest),
    #[serde(rename = "notifyUtxosChangedRequest")]
    NotifyUtxosChanged(NotifyUtxosChangedRequest),
    #[serde(rename = "stopNotifyingUtxosChangedRequest")]
    StopNotifyingUtxosChanged(StopNotifyingUtxosChangedRequest),
    #[serde(rename = "notifyBlockAddedRequest")]
    NotifyBlockAdded(NotifyBlockAddedRequest),
    #[serde(rename = "submitTransactionRequest")]
    SubmitTransaction(SubmitTransactionRequest),
    #[serde(rename = "submitTransactionReplacementRequest")]
    SubmitTransactionReplacement(SubmitTransactionReplacementRequest),
    #[serde(rename = "getFeeEstimateRequest")]
    GetFeeEstimate(GetFeeEstimateRequest),
    #[serde(rename = "getMempoolEntryRequest")]
    GetMempoolEntry(GetMempoolEntryRequest),
    #[serde(rename = "getMempoolEntriesRequest")]
    GetMempoolEntries(GetMempoolEntriesRequest),
    #[serde(rename = "getMempoolEntriesByAddressesRequest")]
    GetMempoolEntriesByAddresses(GetMempoolEntriesByAddressesRequest),
    #[serde(rename = "getCurrentNetworkRequest")]
    GetCurrentNetwork(GetCurrentNetworkRequest),
    #[serde(rename = "getBlockDagInfoRequest")]
    GetBlockDagInfo(GetBlockDagInfoRequest),
    #[serde(rename = "getInfoRequest")]
    GetInfo(GetInfoRequest),
    #[serde(rename = "notifyVirtualSelectedParentChainChangedRequest")]
    NotifyVirtualSelectedParentChainChanged(NotifyVirtualSelectedParentChainChangedRequest),
    #[serde(rename = "getVirtualSelectedParentBlueScoreRequest")]
    GetVirtualSelectedParentBlueScore(GetVirtualSelectedParentBlueScoreRequest),
    #[serde(rename = "notifyVirtualSelectedParentBlueScoreChangedRequest")]
    NotifyVirtualSelectedParentBlueScoreChanged(NotifyVirtualSelectedParentBlueScoreChangedRequest),
    #[serde(rename = "notifyVirtualDaaScoreChangedRequest")]
    NotifyVirtualDaaScoreChanged(NotifyVirtualDaaScoreChangedRequest),
    #[serde(rename = "getBlockRequest")]
    GetBlock(GetBlockRequest),
}

impl KaspadRequest {
    /// Stable variant name, matching the wire tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GetBalancesByAddresses(_) => "getBalancesByAddressesRequest",
            Self::GetUtxosByAddresses(_) => "getUtxosByAddressesRequest",
            Self::NotifyUtxosChanged(_) => "notifyUtxosChangedRequest",
            Self::StopNotifyingUtxosChanged(_) => "stopNotifyingUtxosChangedRequest",
            Self::NotifyBlockAdded(_) => "notifyBlockAddedRequest",
            Self::SubmitTransaction(_) => "submitTransactionRequest",
            Self::SubmitTransactionReplacement(_) => "submitTransactionReplacementRequest",
            Self::GetFeeEstimate(_) => "getFeeEstimateRequest",
            Self::GetMempoolEntry(_) => "getMempoolEntryRequest",
            Self::GetMempoolEntries(_) => "getMempoolEntriesRequest",
            Self::GetMempoolEntriesByAddresses(_) => "getMempoolEntriesByAddressesRequest",
            Self::GetCurrentNetwork(_) => "getCurrentNetworkRequest",
            Self::GetBlockDagInfo(_) => "getBlockDagInfoRequest",
            Self::GetInfo(_) => "getInfoRequest",
            Self::NotifyVirtualSelectedParentChainChanged(_) => {
                "notifyVirtualSelectedParentChainChangedRequest"
            }
            Self::GetVirtualSelectedParentBlueScore(_) => {
                "getVirtualSelectedParentBlueScoreRequest"
            }
            Self::NotifyVirtualSelectedParentBlueScoreChanged(_) => {
                "notifyVirtualSelectedParentBlueScoreChangedRequest"
            }
            Self::NotifyVirtualDaaScoreChanged(_) => "notifyVirtualDaaScoreChangedRequest",
            Self::GetBlock(_) => "getBlockRequest",
        }
    }

    /// True for requests that register a notification listener.
    pub fn is_subscription(&self) -> bool {
        matches!(
            self,
            Self::NotifyUtxosChanged(_)
                | Self::NotifyBlockAdded(_)
                | Self::NotifyVirtualSelectedParentChainChanged(_)
                | Self::NotifyVirtualSelectedParentBlueScoreChanged(_)
                | Self::NotifyVirtualDaaScoreChanged(_)
        )
    }

    /// Zero-valued reply of the matching variant, with an empty error.
    ///
    /// Returns `None` for subscription requests, whose replies are an
    /// open-ended sequence rather than a single message.
    pub fn default_response(&self) -> Option<KaspadResponse> {
        let response = match self {
            Self::GetBalancesByAddresses(_) => {
                KaspadResponse::GetBalancesByAddresses(GetBalancesByAddressesResponse::default())
            }
            Self::GetUtxosByAddresses(_) => {
                KaspadResponse::GetUtxosByAddresses(GetUtxosByAddressesResponse::default())
            }
            Self::StopNotifyingUtxosChanged(_) => KaspadResponse::StopNotifyingUtxosChanged(
                StopNotifyingUtxosChangedResponse::default(),
            ),
            Self::SubmitTransaction(_) => {
                KaspadResponse::SubmitTransaction(SubmitTransactionResponse::default())
            }
            Self::SubmitTransactionReplacement(_) => KaspadResponse::SubmitTransactionReplacement(
                SubmitTransactionReplacementResponse::default(),
            ),
            Self::GetFeeEstimate(_) => {
                KaspadResponse::GetFeeEstimate(GetFeeEstimateResponse::default())
            }
            Self::GetMempoolEntry(_) => {
                KaspadResponse::GetMempoolEntry(GetMempoolEntryResponse::default())
            }
            Self::GetMempoolEntries(_) => {
                KaspadResponse::GetMempoolEntries(GetMempoolEntriesResponse::default())
            }
            Self::GetMempoolEntriesByAddresses(_) => KaspadResponse::GetMempoolEntriesByAddresses(
                GetMempoolEntriesByAddressesResponse::default(),
            ),
            Self::GetCurrentNetwork(_) => {
                KaspadResponse::GetCurrentNetwork(GetCurrentNetworkResponse::default())
            }
            Self::GetBlockDagInfo(_) => {
                KaspadResponse::GetBlockDagInfo(GetBlockDagInfoResponse::default())
            }
            Self::GetInfo(_) => KaspadResponse::GetInfo(GetInfoResponse::default()),
            Self::GetVirtualSelectedParentBlueScore(_) => {
                KaspadResponse::GetVirtualSelectedParentBlueScore(
                    GetVirtualSelectedParentBlueScoreResponse::default(),
                )
            }
            Self::GetBlock(_) => KaspadResponse::GetBlock(GetBlockResponse::default()),
            Self::NotifyUtxosChanged(_)
            | Self::NotifyBlockAdded(_)
            | Self::NotifyVirtualSelectedParentChainChanged(_)
            | Self::NotifyVirtualSelectedParentBlueScoreChanged(_)
            | Self::NotifyVirtualDaaScoreChanged(_) => return None,
        };
        Some(response)
    }

    /// Acknowledgment the node sends first on a subscription exchange.
    ///
    /// Returns `None` for non-subscription requests.
    pub fn subscription_ack(&self) -> Option<KaspadResponse> {
        let ack = match self {
            Self::NotifyUtxosChanged(_) => {
                KaspadResponse::NotifyUtxosChanged(NotifyUtxosChangedResponse::default())
            }
            Self::NotifyBlockAdded(_) => {
                KaspadResponse::NotifyBlockAdded(NotifyBlockAddedResponse::default())
            }
            Self::NotifyVirtualSelectedParentChainChanged(_) => {
                KaspadResponse::NotifyVirtualSelectedParentChainChanged(
                    NotifyVirtualSelectedParentChainChangedResponse::default(),
                )
            }
            Self::NotifyVirtualSelectedParentBlueScoreChanged(_) => {
                KaspadResponse::NotifyVirtualSelectedParentBlueScoreChanged(
                    NotifyVirtualSelectedParentBlueScoreChangedResponse::default(),
                )
            }
            Self::NotifyVirtualDaaScoreChanged(_) => KaspadResponse::NotifyVirtualDaaScoreChanged(
                NotifyVirtualDaaScoreChangedResponse::default(),
            ),
            _ => return None,
        };
        Some(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_tag() {
        let request = KaspadRequest::GetBlock(GetBlockRequest {
            hash: "00ff".to_string(),
            include_transactions: true,
        });

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({"getBlockRequest": {"hash": "00ff", "includeTransactions": true}})
        );
        assert_eq!(request.kind(), "getBlockRequest");
    }

    #[test]
    fn test_mempool_flags_default_to_true() {
        let request: GetMempoolEntryRequest =
            serde_json::from_value(json!({"txId": "aa"})).unwrap();
        assert!(request.include_orphan_pool);
        assert!(request.filter_transaction_pool);

        let request = GetMempoolEntriesByAddressesRequest::default();
        assert!(request.include_orphan_pool);
        assert!(request.filter_transaction_pool);
    }

    #[test]
    fn test_subscription_requests_have_no_default_response() {
        let notify =
            KaspadRequest::NotifyVirtualDaaScoreChanged(NotifyVirtualDaaScoreChangedRequest {});
        assert!(notify.is_subscription());
        assert!(notify.default_response().is_none());
        assert!(notify.subscription_ack().is_some());

        let info = KaspadRequest::GetInfo(GetInfoRequest {});
        assert!(!info.is_subscription());
        assert!(matches!(info.default_response(), Some(KaspadResponse::GetInfo(_))));
        assert!(info.subscription_ack().is_none());
    }

    #[test]
    fn test_stop_notifying_is_a_single_call() {
        let stop = KaspadRequest::StopNotifyingUtxosChanged(StopNotifyingUtxosChangedRequest {
            addresses: vec!["kaspa:qq".to_string()],
        });
        assert!(!stop.is_subscription());
        assert!(matches!(
            stop.default_response(),
            Some(KaspadResponse::StopNotifyingUtxosChanged(_))
        ));
    }
}

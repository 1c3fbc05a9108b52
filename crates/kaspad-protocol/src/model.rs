//! Data model shared by requests, responses and notifications.
//!
//! Field names follow the node's camelCase wire schema. Every struct
//! defaults to its zero value so partially populated messages still parse.

use serde::{Deserialize, Serialize};

/// Balance of a single address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BalancesByAddressEntry {
    pub address: String,
    /// Balance in sompi.
    pub balance: u64,
}

/// Reference to a transaction output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RpcOutpoint {
    pub transaction_id: String,
    pub index: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RpcScriptPublicKey {
    pub version: u32,
    /// Hex-encoded script.
    pub script_public_key: String,
}

/// Unspent output as stored in the UTXO set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RpcUtxoEntry {
    pub amount: u64,
    pub script_public_key: RpcScriptPublicKey,
    pub block_daa_score: u64,
    pub is_coinbase: bool,
}

/// UTXO owned by an address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UtxosByAddressesEntry {
    pub address: String,
    pub outpoint: RpcOutpoint,
    pub utxo_entry: RpcUtxoEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RpcTransactionInput {
    pub previous_outpoint: RpcOutpoint,
    pub signature_script: String,
    pub sequence: u64,
    pub sig_op_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RpcTransactionOutput {
    pub amount: u64,
    pub script_public_key: RpcScriptPublicKey,
}

/// Node-computed details attached to a transaction when requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RpcTransactionVerboseData {
    pub transaction_id: String,
    pub hash: String,
    pub compute_mass: u64,
    pub block_hash: String,
    pub block_time: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RpcTransaction {
    pub version: u32,
    pub inputs: Vec<RpcTransactionInput>,
    pub outputs: Vec<RpcTransactionOutput>,
    pub lock_time: u64,
    pub subnetwork_id: String,
    pub gas: u64,
    pub payload: String,
    pub mass: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose_data: Option<RpcTransactionVerboseData>,
}

/// One feerate bucket of a fee estimate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RpcFeerateBucket {
    /// Feerate in sompi per gram of mass.
    pub feerate: f64,
    pub estimated_seconds: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RpcFeeEstimate {
    pub priority_bucket: RpcFeerateBucket,
    pub normal_buckets: Vec<RpcFeerateBucket>,
    pub low_buckets: Vec<RpcFeerateBucket>,
}

/// Transaction held in the mempool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RpcMempoolEntry {
    pub fee: u64,
    pub transaction: RpcTransaction,
    pub is_orphan: bool,
}

/// Mempool transactions spending from or paying to an address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RpcMempoolEntryByAddress {
    pub address: String,
    pub sending: Vec<RpcMempoolEntry>,
    pub receiving: Vec<RpcMempoolEntry>,
}

/// State of the block DAG as seen by the node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockDagInfo {
    pub network_name: String,
    pub block_count: u64,
    pub header_count: u64,
    pub tip_hashes: Vec<String>,
    pub difficulty: f64,
    pub past_median_time: i64,
    pub virtual_parent_hashes: Vec<String>,
    pub pruning_point_hash: String,
    pub virtual_daa_score: u64,
    pub sink: String,
}

/// General information about the node process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeInfo {
    pub p2p_id: String,
    pub mempool_size: u64,
    pub server_version: String,
    pub is_utxo_indexed: bool,
    pub is_synced: bool,
    pub has_notify_command: bool,
    pub has_message_id: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RpcBlockLevelParents {
    pub parent_hashes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RpcBlockHeader {
    pub version: u32,
    pub parents: Vec<RpcBlockLevelParents>,
    pub hash_merkle_root: String,
    pub accepted_id_merkle_root: String,
    pub utxo_commitment: String,
    pub timestamp: i64,
    pub bits: u32,
    pub nonce: u64,
    pub daa_score: u64,
    pub blue_work: String,
    pub pruning_point: String,
    pub blue_score: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RpcBlockVerboseData {
    pub hash: String,
    pub difficulty_bits: u32,
    pub selected_parent_hash: String,
    pub transaction_ids: Vec<String>,
    pub is_header_only: bool,
    pub blue_score: u64,
    pub children_hashes: Vec<String>,
    pub merge_set_blues_hashes: Vec<String>,
    pub merge_set_reds_hashes: Vec<String>,
    pub is_chain_block: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RpcBlock {
    pub header: RpcBlockHeader,
    pub transactions: Vec<RpcTransaction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose_data: Option<RpcBlockVerboseData>,
}

/// Transactions accepted by one chain block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RpcAcceptedTransactionIds {
    pub accepting_block_hash: String,
    pub accepted_transaction_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_utxo_entry_wire_shape() {
        let entry = UtxosByAddressesEntry {
            address: "kaspa:qz0s".to_string(),
            outpoint: RpcOutpoint {
                transaction_id: "ab".repeat(32),
                index: 1,
            },
            utxo_entry: RpcUtxoEntry {
                amount: 5_000,
                script_public_key: RpcScriptPublicKey {
                    version: 0,
                    script_public_key: "20ab".to_string(),
                },
                block_daa_score: 42,
                is_coinbase: false,
            },
        };

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["utxoEntry"]["blockDaaScore"], 42);
        assert_eq!(value["outpoint"]["index"], 1);
        assert_eq!(value["utxoEntry"]["scriptPublicKey"]["scriptPublicKey"], "20ab");
    }

    #[test]
    fn test_partial_block_dag_info_parses() {
        let info: BlockDagInfo = serde_json::from_value(json!({
            "networkName": "kaspa-mainnet",
            "virtualDaaScore": 1000
        }))
        .unwrap();

        assert_eq!(info.network_name, "kaspa-mainnet");
        assert_eq!(info.virtual_daa_score, 1000);
        assert!(info.tip_hashes.is_empty());
    }

    #[test]
    fn test_transaction_omits_absent_verbose_data() {
        let value = serde_json::to_value(RpcTransaction::default()).unwrap();
        assert!(value.get("verboseData").is_none());
        assert_eq!(value["lockTime"], 0);
    }
}

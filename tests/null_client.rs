//! Null client behavior
//!
//! The null client never touches a network: single calls succeed with
//! zero-valued payloads and subscriptions are empty.

use futures::StreamExt;
use kaspad_client::protocol::*;
use kaspad_client::{KaspadClient, MempoolFilter, SubscriptionState};

// =============================================================================
// Single Calls
// =============================================================================

#[tokio::test]
async fn test_null_single_calls_return_zero_values() {
    let client = KaspadClient::null();
    let addresses = vec!["kaspa:qz0000".to_string()];

    assert!(client.get_balances_by_addresses(addresses.clone()).await.unwrap().is_empty());
    assert!(client.get_utxos_by_addresses(addresses.clone()).await.unwrap().is_empty());
    client.stop_notifying_utxos_changed(addresses.clone()).await.unwrap();
    assert_eq!(
        client.submit_transaction(RpcTransaction::default(), false).await.unwrap(),
        ""
    );
    assert_eq!(
        client
            .submit_transaction_replacement(RpcTransaction::default())
            .await
            .unwrap(),
        (String::new(), RpcTransaction::default())
    );
    assert_eq!(client.get_fee_estimate().await.unwrap(), RpcFeeEstimate::default());
    assert_eq!(client.get_mempool_entry("tx").await.unwrap(), RpcMempoolEntry::default());
    assert!(client.get_mempool_entries().await.unwrap().is_empty());
    assert!(client
        .get_mempool_entries_by_addresses(addresses)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(client.get_current_network().await.unwrap(), "");
    assert_eq!(client.get_block_dag_info().await.unwrap(), BlockDagInfo::default());
    assert_eq!(client.get_info().await.unwrap(), NodeInfo::default());
    assert_eq!(client.get_virtual_selected_parent_blue_score().await.unwrap(), 0);
    assert_eq!(client.get_block_by_hash("00ff", true).await.unwrap(), RpcBlock::default());
}

#[tokio::test]
async fn test_null_filtered_mempool_calls_succeed() {
    let client = KaspadClient::null();
    let filter = MempoolFilter {
        include_orphan_pool: false,
        filter_transaction_pool: false,
    };

    client.get_mempool_entry_filtered("tx", filter).await.unwrap();
    client.get_mempool_entries_filtered(filter).await.unwrap();
    client
        .get_mempool_entries_by_addresses_filtered(vec![], filter)
        .await
        .unwrap();
}

// =============================================================================
// Subscriptions
// =============================================================================

#[tokio::test]
async fn test_null_subscriptions_are_empty() {
    let client = KaspadClient::null();

    let mut utxos = client.notify_utxos_changed(vec!["kaspa:qz0000".to_string()]).await.unwrap();
    assert!(utxos.next().await.is_none());
    assert_eq!(utxos.state(), SubscriptionState::Closed);

    let mut blocks = client.notify_block_added().await.unwrap();
    assert!(blocks.next().await.is_none());

    let mut chain = client
        .notify_virtual_selected_parent_chain_changed(false)
        .await
        .unwrap();
    assert!(chain.next().await.is_none());

    let mut blue_scores = client
        .notify_virtual_selected_parent_blue_score_changed()
        .await
        .unwrap();
    assert!(blue_scores.next().await.is_none());

    let mut daa_scores = client.notify_virtual_daa_score_changed().await.unwrap();
    assert!(daa_scores.next().await.is_none());
}

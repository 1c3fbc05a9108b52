//! Node RPC Client
//!
//! Typed operations over the node's RPC interface. Every single-shape
//! operation is one exchange: build the request, send it, unwrap the first
//! reply. Every subscribe-shape operation keeps its exchange open and
//! yields notifications through a [`Subscription`].

use std::sync::Arc;

use kaspad_protocol::*;

use crate::config::EndpointConfig;
use crate::transport::{NullTransport, StreamTransport, TcpConnector, Transport};

use super::call::{single_call, streaming_call, unwrap_response};
use super::error::ClientResult;
use super::subscription::Subscription;

/// Pool selection for mempool queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MempoolFilter {
    /// Also search the orphan pool
    pub include_orphan_pool: bool,
    /// Search the transaction pool
    pub filter_transaction_pool: bool,
}

impl Default for MempoolFilter {
    fn default() -> Self {
        Self {
            include_orphan_pool: true,
            filter_transaction_pool: true,
        }
    }
}

/// Node RPC client
///
/// Cheap to clone. Calls made from clones, or concurrently from one handle,
/// never share an exchange.
#[derive(Clone)]
pub struct KaspadClient {
    transport: Arc<dyn Transport>,
}

impl KaspadClient {
    /// Create a client over the given transport
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Create a client for a node endpoint.
    ///
    /// No connection is made here; each call opens its own.
    pub fn connect(endpoint: &EndpointConfig) -> Self {
        let transport = StreamTransport::new(TcpConnector::from_config(endpoint));
        Self::with_transport(Arc::new(transport))
    }

    /// Create a client for `host:port`, optionally over TLS
    pub fn new(host: impl Into<String>, port: u16, tls: bool) -> Self {
        let mut connector = TcpConnector::new(host, port);
        if tls {
            connector = connector.with_tls();
        }
        Self::with_transport(Arc::new(StreamTransport::new(connector)))
    }

    /// Client whose calls all succeed with zero-valued payloads and whose
    /// subscriptions yield nothing
    pub fn null() -> Self {
        Self::with_transport(Arc::new(NullTransport))
    }

    async fn call<M, T>(
        &self,
        request: KaspadRequest,
        payload: impl FnOnce(M) -> T,
    ) -> ClientResult<T>
    where
        M: ResponseMessage,
    {
        let response = single_call(self.transport.as_ref(), request).await?;
        unwrap_response(response, payload)
    }

    async fn subscribe<T>(
        &self,
        request: KaspadRequest,
        extract: fn(KaspadResponse) -> ClientResult<T>,
    ) -> ClientResult<Subscription<T>> {
        let kind = request.kind();
        let exchange = streaming_call(self.transport.as_ref(), request).await?;
        Ok(Subscription::new(kind, exchange, extract))
    }

    // === Addresses ===

    /// Balance of each address
    pub async fn get_balances_by_addresses(
        &self,
        addresses: Vec<String>,
    ) -> ClientResult<Vec<BalancesByAddressEntry>> {
        let request =
            KaspadRequest::GetBalancesByAddresses(GetBalancesByAddressesRequest { addresses });
        self.call(request, |r: GetBalancesByAddressesResponse| r.entries).await
    }

    /// Unspent outputs owned by the addresses
    pub async fn get_utxos_by_addresses(
        &self,
        addresses: Vec<String>,
    ) -> ClientResult<Vec<UtxosByAddressesEntry>> {
        let request = KaspadRequest::GetUtxosByAddresses(GetUtxosByAddressesRequest { addresses });
        self.call(request, |r: GetUtxosByAddressesResponse| r.entries).await
    }

    /// Stream of UTXO changes touching the addresses.
    ///
    /// Dropping or cancelling the subscription only releases the local
    /// exchange. Call [`KaspadClient::stop_notifying_utxos_changed`] to
    /// unregister on the node.
    pub async fn notify_utxos_changed(
        &self,
        addresses: Vec<String>,
    ) -> ClientResult<Subscription<UtxosChangedNotification>> {
        let request = KaspadRequest::NotifyUtxosChanged(NotifyUtxosChangedRequest { addresses });
        self.subscribe(request, |r| unwrap_response(r, |n: UtxosChangedNotification| n))
            .await
    }

    /// Unregister UTXO change notifications for the addresses
    pub async fn stop_notifying_utxos_changed(&self, addresses: Vec<String>) -> ClientResult<()> {
        let request = KaspadRequest::StopNotifyingUtxosChanged(StopNotifyingUtxosChangedRequest {
            addresses,
        });
        self.call(request, |_: StopNotifyingUtxosChangedResponse| ()).await
    }

    // === Blocks and DAG ===

    /// Stream of blocks as the node adds them
    pub async fn notify_block_added(&self) -> ClientResult<Subscription<RpcBlock>> {
        let request = KaspadRequest::NotifyBlockAdded(NotifyBlockAddedRequest {});
        self.subscribe(request, |r| unwrap_response(r, |n: BlockAddedNotification| n.block))
            .await
    }

    /// Block with the given hash
    pub async fn get_block_by_hash(
        &self,
        hash: impl Into<String>,
        include_transactions: bool,
    ) -> ClientResult<RpcBlock> {
        let request = KaspadRequest::GetBlock(GetBlockRequest {
            hash: hash.into(),
            include_transactions,
        });
        self.call(request, |r: GetBlockResponse| r.block).await
    }

    pub async fn get_block_dag_info(&self) -> ClientResult<BlockDagInfo> {
        let request = KaspadRequest::GetBlockDagInfo(GetBlockDagInfoRequest {});
        self.call(request, |r: GetBlockDagInfoResponse| r.info).await
    }

    /// Stream of virtual selected parent chain changes
    pub async fn notify_virtual_selected_parent_chain_changed(
        &self,
        include_accepted_transaction_ids: bool,
    ) -> ClientResult<Subscription<VirtualSelectedParentChainChangedNotification>> {
        let request = KaspadRequest::NotifyVirtualSelectedParentChainChanged(
            NotifyVirtualSelectedParentChainChangedRequest {
                include_accepted_transaction_ids,
            },
        );
        self.subscribe(request, |r| {
            unwrap_response(r, |n: VirtualSelectedParentChainChangedNotification| n)
        })
        .await
    }

    pub async fn get_virtual_selected_parent_blue_score(&self) -> ClientResult<u64> {
        let request = KaspadRequest::GetVirtualSelectedParentBlueScore(
            GetVirtualSelectedParentBlueScoreRequest {},
        );
        self.call(request, |r: GetVirtualSelectedParentBlueScoreResponse| r.blue_score)
            .await
    }

    /// Stream of virtual selected parent blue scores
    pub async fn notify_virtual_selected_parent_blue_score_changed(
        &self,
    ) -> ClientResult<Subscription<u64>> {
        let request = KaspadRequest::NotifyVirtualSelectedParentBlueScoreChanged(
            NotifyVirtualSelectedParentBlueScoreChangedRequest {},
        );
        self.subscribe(request, |r| {
            unwrap_response(r, |n: VirtualSelectedParentBlueScoreChangedNotification| {
                n.virtual_selected_parent_blue_score
            })
        })
        .await
    }

    /// Stream of virtual DAA scores
    pub async fn notify_virtual_daa_score_changed(&self) -> ClientResult<Subscription<u64>> {
        let request =
            KaspadRequest::NotifyVirtualDaaScoreChanged(NotifyVirtualDaaScoreChangedRequest {});
        self.subscribe(request, |r| {
            unwrap_response(r, |n: VirtualDaaScoreChangedNotification| n.virtual_daa_score)
        })
        .await
    }

    // === Transactions ===

    /// Submit a transaction, returning its id
    pub async fn submit_transaction(
        &self,
        transaction: RpcTransaction,
        allow_orphan: bool,
    ) -> ClientResult<String> {
        let request = KaspadRequest::SubmitTransaction(SubmitTransactionRequest {
            transaction,
            allow_orphan,
        });
        self.call(request, |r: SubmitTransactionResponse| r.transaction_id).await
    }

    /// Submit a transaction replacing a mempool one, returning the new id
    /// and the transaction it replaced
    pub async fn submit_transaction_replacement(
        &self,
        transaction: RpcTransaction,
    ) -> ClientResult<(String, RpcTransaction)> {
        let request = KaspadRequest::SubmitTransactionReplacement(
            SubmitTransactionReplacementRequest { transaction },
        );
        self.call(request, |r: SubmitTransactionReplacementResponse| {
            (r.transaction_id, r.replaced_transaction)
        })
        .await
    }

    pub async fn get_fee_estimate(&self) -> ClientResult<RpcFeeEstimate> {
        let request = KaspadRequest::GetFeeEstimate(GetFeeEstimateRequest {});
        self.call(request, |r: GetFeeEstimateResponse| r.estimate).await
    }

    // === Mempool ===

    /// Mempool entry for a transaction, searching both pools
    pub async fn get_mempool_entry(
        &self,
        tx_id: impl Into<String>,
    ) -> ClientResult<RpcMempoolEntry> {
        self.get_mempool_entry_filtered(tx_id, MempoolFilter::default()).await
    }

    pub async fn get_mempool_entry_filtered(
        &self,
        tx_id: impl Into<String>,
        filter: MempoolFilter,
    ) -> ClientResult<RpcMempoolEntry> {
        let request = KaspadRequest::GetMempoolEntry(GetMempoolEntryRequest {
            tx_id: tx_id.into(),
            include_orphan_pool: filter.include_orphan_pool,
            filter_transaction_pool: filter.filter_transaction_pool,
        });
        self.call(request, |r: GetMempoolEntryResponse| r.entry).await
    }

    /// Every mempool entry, from both pools
    pub async fn get_mempool_entries(&self) -> ClientResult<Vec<RpcMempoolEntry>> {
        self.get_mempool_entries_filtered(MempoolFilter::default()).await
    }

    pub async fn get_mempool_entries_filtered(
        &self,
        filter: MempoolFilter,
    ) -> ClientResult<Vec<RpcMempoolEntry>> {
        let request = KaspadRequest::GetMempoolEntries(GetMempoolEntriesRequest {
            include_orphan_pool: filter.include_orphan_pool,
            filter_transaction_pool: filter.filter_transaction_pool,
        });
        self.call(request, |r: GetMempoolEntriesResponse| r.entries).await
    }

    /// Mempool entries spending from or paying to the addresses
    pub async fn get_mempool_entries_by_addresses(
        &self,
        addresses: Vec<String>,
    ) -> ClientResult<Vec<RpcMempoolEntryByAddress>> {
        self.get_mempool_entries_by_addresses_filtered(addresses, MempoolFilter::default())
            .await
    }

    pub async fn get_mempool_entries_by_addresses_filtered(
        &self,
        addresses: Vec<String>,
        filter: MempoolFilter,
    ) -> ClientResult<Vec<RpcMempoolEntryByAddress>> {
        let request =
            KaspadRequest::GetMempoolEntriesByAddresses(GetMempoolEntriesByAddressesRequest {
                addresses,
                include_orphan_pool: filter.include_orphan_pool,
                filter_transaction_pool: filter.filter_transaction_pool,
            });
        self.call(request, |r: GetMempoolEntriesByAddressesResponse| r.entries)
            .await
    }

    // === Node ===

    /// Name of the network the node runs on
    pub async fn get_current_network(&self) -> ClientResult<String> {
        let request = KaspadRequest::GetCurrentNetwork(GetCurrentNetworkRequest {});
        self.call(request, |r: GetCurrentNetworkResponse| r.current_network)
            .await
    }

    pub async fn get_info(&self) -> ClientResult<NodeInfo> {
        let request = KaspadRequest::GetInfo(GetInfoRequest {});
        self.call(request, |r: GetInfoResponse| r.info).await
    }
}

impl std::fmt::Debug for KaspadClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KaspadClient").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use crate::mock::MockNode;

    fn client(node: &MockNode) -> KaspadClient {
        KaspadClient::with_transport(Arc::new(node.clone()))
    }

    #[tokio::test]
    async fn test_mempool_filter_defaults_reach_the_wire() {
        let node = MockNode::new();
        client(&node).get_mempool_entry("aa").await.unwrap();

        let requests = node.last_exchange().unwrap().requests();
        assert_eq!(
            requests,
            vec![KaspadRequest::GetMempoolEntry(GetMempoolEntryRequest {
                tx_id: "aa".to_string(),
                include_orphan_pool: true,
                filter_transaction_pool: true,
            })]
        );
    }

    #[tokio::test]
    async fn test_mempool_filter_override_is_independent() {
        let node = MockNode::new();
        let filter = MempoolFilter {
            include_orphan_pool: false,
            ..Default::default()
        };
        client(&node).get_mempool_entries_filtered(filter).await.unwrap();

        let requests = node.last_exchange().unwrap().requests();
        assert_eq!(
            requests,
            vec![KaspadRequest::GetMempoolEntries(GetMempoolEntriesRequest {
                include_orphan_pool: false,
                filter_transaction_pool: true,
            })]
        );
    }

    #[tokio::test]
    async fn test_wrong_variant_reply_is_unexpected_response() {
        let node = MockNode::new();
        node.script("getInfoRequest", vec![KaspadResponse::from(GetBlockResponse::default())]);

        let err = client(&node).get_info().await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::UnexpectedResponse {
                expected: "getInfoResponse",
                actual: "getBlockResponse",
            }
        ));
    }

    #[tokio::test]
    async fn test_clones_use_separate_exchanges() {
        let node = MockNode::new();
        let first = client(&node);
        let second = first.clone();

        let (a, b) = tokio::join!(first.get_current_network(), second.get_block_dag_info());
        a.unwrap();
        b.unwrap();

        assert_eq!(node.exchanges().len(), 2);
        assert_eq!(node.open_exchanges(), 0);
    }
}

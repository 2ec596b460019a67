//! Chain RPC — producer vote totals used for guild ranking.

pub mod rpc;

use async_trait::async_trait;

pub use rpc::ChainRpcClient;

#[derive(Debug, Clone, PartialEq)]
pub struct ProducerVotes {
    pub owner: String,
    pub total_votes: f64,
}

#[async_trait]
pub trait ProducerSource: Send + Sync {
    /// Current producers with their vote totals, at most `limit` of them.
    async fn producers(&self, limit: u32) -> anyhow::Result<Vec<ProducerVotes>>;
}

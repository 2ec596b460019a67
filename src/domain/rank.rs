//! Guild ranking by on-chain producer votes.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::{info, warn};

use crate::chain::{ProducerSource, ProducerVotes};

/// Rank producers by votes, highest first. Ties keep their input order.
/// Ranks start at 1; an account listed twice keeps its best rank.
pub fn compute_ranks(producers: &[ProducerVotes]) -> HashMap<String, u32> {
    let mut ordered: Vec<&ProducerVotes> = producers.iter().collect();
    ordered.sort_by(|a, b| {
        b.total_votes
            .partial_cmp(&a.total_votes)
            .unwrap_or(Ordering::Equal)
    });

    let mut ranks = HashMap::with_capacity(ordered.len());
    for (index, producer) in ordered.iter().enumerate() {
        ranks.entry(producer.owner.clone()).or_insert(index as u32 + 1);
    }
    ranks
}

/// Fetch producers and rank them. Any failure degrades to an empty map, so
/// guilds render without a rank instead of failing the list.
pub async fn resolve_ranks(source: &dyn ProducerSource, limit: u32) -> HashMap<String, u32> {
    match source.producers(limit).await {
        Ok(producers) => {
            info!(producers = producers.len(), "fetched producer votes");
            compute_ranks(&producers)
        }
        Err(e) => {
            warn!(error = %e, limit, "failed to fetch producer votes, ranks omitted");
            HashMap::new()
        }
    }
}

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::url::combine_url_with_path;

use super::{ProducerSource, ProducerVotes};

const GET_PRODUCERS_PATH: &str = "/v1/chain/get_producers";

pub struct ChainRpcClient {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct GetProducersRequest<'a> {
    json: bool,
    lower_bound: &'a str,
    limit: u32,
}

#[derive(Deserialize)]
struct GetProducersResponse {
    rows: Vec<ProducerRow>,
}

#[derive(Deserialize)]
struct ProducerRow {
    owner: String,
    total_votes: String,
}

impl ChainRpcClient {
    pub fn new(api_endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("building chain RPC client")?;
        Ok(Self {
            client,
            url: combine_url_with_path(api_endpoint, GET_PRODUCERS_PATH),
        })
    }
}

fn parse_producers(body: &str) -> Result<Vec<ProducerVotes>> {
    let response: GetProducersResponse =
        serde_json::from_str(body).context("malformed get_producers response")?;
    response
        .rows
        .into_iter()
        .map(|row| {
            let total_votes = row
                .total_votes
                .trim()
                .parse::<f64>()
                .with_context(|| format!("invalid total_votes for {}", row.owner))?;
            Ok(ProducerVotes {
                owner: row.owner,
                total_votes,
            })
        })
        .collect()
}

#[async_trait]
impl ProducerSource for ChainRpcClient {
    async fn producers(&self, limit: u32) -> Result<Vec<ProducerVotes>> {
        let body = self
            .client
            .post(&self.url)
            .json(&GetProducersRequest {
                json: true,
                lower_bound: "",
                limit,
            })
            .send()
            .await
            .with_context(|| format!("POST {}", self.url))?
            .error_for_status()
            .context("chain API returned error status")?
            .text()
            .await
            .context("reading get_producers response")?;

        parse_producers(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vote_strings() {
        let body = r#"{
            "rows": [
                {"owner": "eosnationftw", "total_votes": "13034932811862432.00000000000000000", "is_active": 1},
                {"owner": "eosasia11111", "total_votes": "9.5"}
            ],
            "total_producer_vote_weight": "1.0",
            "more": ""
        }"#;
        let producers = parse_producers(body).unwrap();
        assert_eq!(producers.len(), 2);
        assert_eq!(producers[0].owner, "eosnationftw");
        assert!(producers[0].total_votes > producers[1].total_votes);
    }

    #[test]
    fn rejects_bad_votes() {
        let body = r#"{"rows": [{"owner": "x", "total_votes": "lots"}]}"#;
        assert!(parse_producers(body).is_err());
        assert!(parse_producers("<html>").is_err());
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let client = ChainRpcClient::new("https://proxy.io/eos", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url, "https://proxy.io/eos/v1/chain/get_producers");
    }
}

//! OpenSea API integration.
//!
//! Read-only access to the collection's sale events and summary statistics.

use crate::error::{GlyphBotsError, Result};
use crate::utils::format::format_token_amount;
use serde::Deserialize;
use tracing::debug;

/// Most sales a single request may return.
pub const MAX_SALES: u32 = 10;

#[derive(Deserialize, Debug)]
struct EventsResponse {
    #[serde(default)]
    asset_events: Vec<AssetEvent>,
}

#[derive(Deserialize, Debug)]
struct AssetEvent {
    #[serde(default)]
    event_type: String,
    #[serde(default)]
    event_timestamp: i64,
    #[serde(default)]
    transaction: Option<String>,
    #[serde(default)]
    seller: Option<String>,
    #[serde(default)]
    buyer: Option<String>,
    #[serde(default)]
    nft: Option<EventNft>,
    #[serde(default)]
    payment: Option<EventPayment>,
}

#[derive(Deserialize, Debug)]
struct EventNft {
    identifier: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    opensea_url: Option<String>,
}

#[derive(Deserialize, Debug)]
struct EventPayment {
    quantity: String,
    #[serde(default = "default_decimals")]
    decimals: u32,
    #[serde(default = "default_symbol")]
    symbol: String,
}

fn default_decimals() -> u32 {
    18
}

fn default_symbol() -> String {
    "ETH".to_string()
}

/// A completed sale of a collection item.
#[derive(Debug, Clone)]
pub struct Sale {
    pub token_id: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub opensea_url: Option<String>,
    /// Raw integer payment amount (e.g. wei)
    pub price_raw: String,
    pub decimals: u32,
    pub symbol: String,
    pub seller: Option<String>,
    pub buyer: Option<String>,
    /// Unix seconds
    pub timestamp: i64,
    pub transaction: Option<String>,
}

impl Sale {
    /// Human-readable price such as `0.42 ETH`.
    pub fn price_display(&self) -> String {
        match format_token_amount(&self.price_raw, self.decimals) {
            Some(amount) => format!("{} {}", amount, self.symbol),
            None => format!("{} (raw) {}", self.price_raw, self.symbol),
        }
    }

    fn from_event(event: AssetEvent) -> Option<Self> {
        if event.event_type != "sale" {
            return None;
        }
        let nft = event.nft?;
        let payment = event.payment?;

        Some(Self {
            token_id: nft.identifier,
            name: nft.name,
            image_url: nft.image_url,
            opensea_url: nft.opensea_url,
            price_raw: payment.quantity,
            decimals: payment.decimals,
            symbol: payment.symbol,
            seller: event.seller,
            buyer: event.buyer,
            timestamp: event.event_timestamp,
            transaction: event.transaction,
        })
    }
}

#[derive(Deserialize, Debug)]
struct StatsResponse {
    total: CollectionStats,
}

/// Collection-wide totals.
#[derive(Deserialize, Debug, Clone)]
pub struct CollectionStats {
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub sales: u64,
    #[serde(default)]
    pub num_owners: u64,
    #[serde(default)]
    pub floor_price: Option<f64>,
    #[serde(default)]
    pub floor_price_symbol: Option<String>,
}

/// Client for the OpenSea v2 API.
#[derive(Clone)]
pub struct OpenSeaClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    collection_slug: String,
}

impl OpenSeaClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        collection_slug: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            collection_slug: collection_slug.into(),
        }
    }

    /// Whether an API key is configured.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Most recent sales, newest first. `limit` is clamped to `1..=10`.
    pub async fn recent_sales(&self, limit: u32) -> Result<Vec<Sale>> {
        let limit = limit.clamp(1, MAX_SALES);
        let url = format!("{}/events/collection/{}", self.base_url, self.collection_slug);

        let response: EventsResponse = self
            .get_json(&url, &[("event_type", "sale".to_string()), ("limit", limit.to_string())])
            .await?;

        let total = response.asset_events.len();
        let sales: Vec<Sale> = response
            .asset_events
            .into_iter()
            .filter_map(Sale::from_event)
            .collect();
        if sales.len() != total {
            debug!(skipped = total - sales.len(), "skipped incomplete sale events");
        }

        Ok(sales)
    }

    /// Collection floor, volume, sales and owner totals.
    pub async fn collection_stats(&self) -> Result<CollectionStats> {
        let url = format!("{}/collections/{}/stats", self.base_url, self.collection_slug);
        let response: StatsResponse = self.get_json(&url, &[]).await?;
        Ok(response.total)
    }

    async fn get_json<T>(&self, url: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            GlyphBotsError::Config("OPENSEA_API_KEY is not set".to_string())
        })?;

        let resp = self
            .http
            .get(url)
            .header("X-API-KEY", api_key)
            .header("accept", "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| GlyphBotsError::OpenSea(format!("Request failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(GlyphBotsError::OpenSea(format!(
                "API returned error: {}",
                resp.status()
            )));
        }

        resp.json::<T>()
            .await
            .map_err(|e| GlyphBotsError::OpenSea(format!("Invalid response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENTS_JSON: &str = r#"{
        "asset_events": [
            {
                "event_type": "sale",
                "event_timestamp": 1760000000,
                "transaction": "0xabc",
                "seller": "0x1111111111111111111111111111111111111111",
                "buyer": "0x2222222222222222222222222222222222222222",
                "nft": {
                    "identifier": "42",
                    "name": "GlyphBot #42",
                    "image_url": "https://img.example/42.png",
                    "opensea_url": "https://opensea.io/assets/ethereum/0x0/42"
                },
                "payment": {
                    "quantity": "420000000000000000",
                    "token_address": "0x0000000000000000000000000000000000000000",
                    "decimals": 18,
                    "symbol": "ETH"
                }
            },
            {
                "event_type": "sale",
                "event_timestamp": 1759990000,
                "nft": null,
                "payment": null
            }
        ],
        "next": "cursor"
    }"#;

    fn client(url: String) -> OpenSeaClient {
        OpenSeaClient::new(reqwest::Client::new(), url, Some("test-key".to_string()), "glyphbots")
    }

    #[tokio::test]
    async fn test_recent_sales() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/events/collection/glyphbots")
            .match_header("x-api-key", "test-key")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("event_type".into(), "sale".into()),
                mockito::Matcher::UrlEncoded("limit".into(), "10".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(EVENTS_JSON)
            .create_async()
            .await;

        let sales = client(server.url()).recent_sales(25).await.unwrap();

        mock.assert_async().await;
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].token_id, "42");
        assert_eq!(sales[0].price_display(), "0.42 ETH");
        assert_eq!(sales[0].timestamp, 1760000000);
    }

    #[tokio::test]
    async fn test_collection_stats() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/collections/glyphbots/stats")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"total": {"volume": 812.5, "sales": 9120, "num_owners": 3301,
                    "floor_price": 0.0425, "floor_price_symbol": "ETH"}, "intervals": []}"#,
            )
            .create_async()
            .await;

        let stats = client(server.url()).collection_stats().await.unwrap();
        assert_eq!(stats.sales, 9120);
        assert_eq!(stats.num_owners, 3301);
        assert_eq!(stats.floor_price, Some(0.0425));
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let client =
            OpenSeaClient::new(reqwest::Client::new(), "http://127.0.0.1:1", None, "glyphbots");
        assert!(!client.is_configured());
        assert!(matches!(client.recent_sales(5).await, Err(GlyphBotsError::Config(_))));
    }

    #[tokio::test]
    async fn test_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/collections/glyphbots/stats")
            .with_status(401)
            .create_async()
            .await;

        let result = client(server.url()).collection_stats().await;
        assert!(matches!(result, Err(GlyphBotsError::OpenSea(msg)) if msg.contains("401")));
    }
}

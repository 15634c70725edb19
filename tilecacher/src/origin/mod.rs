//! Tile origins.
//!
//! A [`TileOrigin`] produces the bytes for an (already adjusted) tile
//! coordinate. The fetch pipeline is polymorphic over this trait: the HTTP
//! origin here covers the normal case of a slippy-map tile server,
//! optionally reached through a referrer-carrying relay endpoint, while
//! tests substitute in-memory origins.

mod http;

pub use http::{FetchConfig, HttpClient, ReqwestClient};

#[cfg(test)]
pub use http::tests::MockHttpClient;

use std::sync::Arc;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::coord::TileCoord;
use crate::layer::Layer;

/// Errors from fetching or decoding a tile image.
///
/// Always scoped to a single tile: the enclosing job logs and skips, it
/// never aborts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// Network or HTTP-level failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The fetch URL (template expansion or proxy rewrite) is malformed.
    #[error("invalid fetch URL: {0}")]
    InvalidUrl(String),

    /// The fetched bytes do not decode as an image.
    #[error("image decode failed: {0}")]
    Decode(String),
}

/// Source of tile bytes for a coordinate.
///
/// Implementations own URL construction (or whatever request shape their
/// backend needs); the pipeline hands them the adjusted coordinate and
/// nothing else.
pub trait TileOrigin: Send + Sync {
    /// Fetch the raw image bytes for an adjusted tile coordinate.
    fn fetch(&self, coord: &TileCoord) -> BoxFuture<'_, Result<Vec<u8>, FetchError>>;

    /// Origin name for logging.
    fn name(&self) -> &str;
}

/// HTTP tile origin: URL template expansion plus optional relay rewrite.
///
/// When the layer configures a `proxy`, the expanded origin URL is rewritten
/// to `proxy?img=<encoded url>&ref=<encoded referrer>`. The relay fetches
/// the image server-side with the configured `Referer` header attached and
/// streams the bytes back. With no referrer configured, `ref` is omitted.
pub struct HttpTileOrigin {
    layer: Arc<Layer>,
    client: Arc<dyn HttpClient>,
}

impl HttpTileOrigin {
    /// Create an origin for the given layer over the given client.
    pub fn new(layer: Arc<Layer>, client: Arc<dyn HttpClient>) -> Self {
        Self { layer, client }
    }

    /// Build the final fetch URL for a coordinate.
    fn fetch_url(&self, coord: &TileCoord) -> Result<String, FetchError> {
        let origin_url = self.layer.tile_url(coord);

        let Some(proxy) = self.layer.proxy() else {
            return Ok(origin_url);
        };

        let mut params = vec![("img", origin_url.as_str())];
        if let Some(referrer) = self.layer.referrer() {
            params.push(("ref", referrer));
        }

        reqwest::Url::parse_with_params(proxy, &params)
            .map(|u| u.to_string())
            .map_err(|e| FetchError::InvalidUrl(format!("proxy URL {}: {}", proxy, e)))
    }
}

impl TileOrigin for HttpTileOrigin {
    fn fetch(&self, coord: &TileCoord) -> BoxFuture<'_, Result<Vec<u8>, FetchError>> {
        let coord = *coord;
        Box::pin(async move {
            let url = self.fetch_url(&coord)?;
            self.client.get(&url).await
        })
    }

    fn name(&self) -> &str {
        self.layer.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer() -> Layer {
        Layer::new("base", "https://tile.example.org/{z}/{x}/{y}.png")
    }

    #[tokio::test]
    async fn test_http_origin_expands_template() {
        let mock = Arc::new(MockHttpClient::always(Ok(vec![9, 9])));
        let origin = HttpTileOrigin::new(Arc::new(layer()), mock.clone());

        let data = origin.fetch(&TileCoord::new(2, 1, 3)).await.unwrap();
        assert_eq!(data, vec![9, 9]);
        assert_eq!(
            mock.requests.lock()[0],
            "https://tile.example.org/3/2/1.png"
        );
    }

    #[tokio::test]
    async fn test_http_origin_rewrites_through_proxy() {
        let mock = Arc::new(MockHttpClient::always(Ok(vec![1])));
        let layer = layer()
            .with_proxy("https://relay.example.org/imageProxy")
            .with_referrer("https://map.example.org");
        let origin = HttpTileOrigin::new(Arc::new(layer), mock.clone());

        origin.fetch(&TileCoord::new(2, 1, 3)).await.unwrap();

        let requested = mock.requests.lock()[0].clone();
        assert!(requested.starts_with("https://relay.example.org/imageProxy?"));
        assert!(requested.contains("img=https%3A%2F%2Ftile.example.org%2F3%2F2%2F1.png"));
        assert!(requested.contains("ref=https%3A%2F%2Fmap.example.org"));
    }

    #[tokio::test]
    async fn test_http_origin_proxy_without_referrer_omits_ref() {
        let mock = Arc::new(MockHttpClient::always(Ok(vec![1])));
        let layer = layer().with_proxy("https://relay.example.org/imageProxy");
        let origin = HttpTileOrigin::new(Arc::new(layer), mock.clone());

        origin.fetch(&TileCoord::new(0, 0, 1)).await.unwrap();

        let requested = mock.requests.lock()[0].clone();
        assert!(requested.contains("img="));
        assert!(!requested.contains("ref="));
    }

    #[tokio::test]
    async fn test_http_origin_invalid_proxy_url() {
        let mock = Arc::new(MockHttpClient::always(Ok(vec![1])));
        let layer = layer().with_proxy("not a url");
        let origin = HttpTileOrigin::new(Arc::new(layer), mock.clone());

        let result = origin.fetch(&TileCoord::new(0, 0, 1)).await;
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_http_origin_propagates_http_error() {
        let mock = Arc::new(MockHttpClient::always(Err(FetchError::Http(
            "HTTP 404".into(),
        ))));
        let origin = HttpTileOrigin::new(Arc::new(layer()), mock);

        let result = origin.fetch(&TileCoord::new(0, 0, 1)).await;
        assert!(matches!(result, Err(FetchError::Http(_))));
    }

    #[test]
    fn test_origin_name_is_layer_name() {
        let mock = Arc::new(MockHttpClient::always(Ok(vec![])));
        let origin = HttpTileOrigin::new(Arc::new(layer()), mock);
        assert_eq!(origin.name(), "base");
    }
}

//! Upstream HTTP tile source.

use super::http::{AsyncHttpClient, HttpResponse, TransportError};
use super::{FetchError, TileSource};
use crate::grid::TileRequest;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Media-type prefix a tile response must carry.
const IMAGE_CONTENT_PREFIX: &str = "image/";

/// Errors in the configured upstream base URL.
#[derive(Debug, Error)]
pub enum UpstreamUrlError {
    /// The URL does not parse.
    #[error("invalid upstream URL '{url}': {source}")]
    Parse {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The URL parses but is not http(s).
    #[error("upstream URL '{0}' must use http or https")]
    Scheme(String),
}

/// Tile source that asks the upstream provider for each cell.
///
/// Requests are `GET {base}?q=..&page=..&cols=..&rows=..&i=..`, with any
/// query parameters already present on the base URL kept in front.
pub struct UpstreamTileSource<C: AsyncHttpClient> {
    client: C,
    base_url: Url,
}

impl<C: AsyncHttpClient> UpstreamTileSource<C> {
    /// Creates a source for the given upstream base URL.
    pub fn new(client: C, base_url: &str) -> Result<Self, UpstreamUrlError> {
        let parsed = Url::parse(base_url.trim()).map_err(|source| UpstreamUrlError::Parse {
            url: base_url.to_string(),
            source,
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(UpstreamUrlError::Scheme(base_url.to_string()));
        }

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// Upstream base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the upstream URL for one tile.
    pub fn build_url(&self, request: &TileRequest) -> Url {
        let shape = request.shape();
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("q", request.query())
            .append_pair("page", &request.page().to_string())
            .append_pair("cols", &shape.columns().to_string())
            .append_pair("rows", &shape.rows().to_string())
            .append_pair("i", &request.index().to_string());
        url
    }
}

impl<C: AsyncHttpClient> TileSource for UpstreamTileSource<C> {
    async fn fetch(&self, request: &TileRequest) -> Result<Vec<u8>, FetchError> {
        let index = request.index();
        let url = self.build_url(request);

        let response = self
            .client
            .get(url.as_str())
            .await
            .map_err(|e| match e {
                TransportError::Timeout => FetchError::Timeout { index },
                TransportError::Failed(reason) => FetchError::Network { index, reason },
            })?;

        let body = validate(index, response).inspect_err(|e| {
            warn!(tile = index, error = %e, "Tile rejected");
        })?;

        debug!(tile = index, bytes = body.len(), "Tile fetched");
        Ok(body)
    }

    fn name(&self) -> &str {
        "upstream"
    }
}

/// Accepts a response only if it is a direct 2xx image.
fn validate(index: usize, response: HttpResponse) -> Result<Vec<u8>, FetchError> {
    let status = response.status;
    if (300..400).contains(&status) {
        return Err(FetchError::Redirect { index, status });
    }
    if !(200..300).contains(&status) {
        return Err(FetchError::Status { index, status });
    }

    match response.content_type {
        Some(ref content_type) if is_image(content_type) => Ok(response.body.to_vec()),
        other => Err(FetchError::ContentType {
            index,
            content_type: other.unwrap_or_else(|| "<missing>".to_string()),
        }),
    }
}

fn is_image(content_type: &str) -> bool {
    content_type
        .trim_start()
        .to_ascii_lowercase()
        .starts_with(IMAGE_CONTENT_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{MockHttpClient, ReqwestClient};
    use crate::grid::GridShape;
    use bytes::Bytes;

    fn tile(index: usize) -> TileRequest {
        TileRequest::new("cat videos", 0, GridShape::default(), index)
    }

    fn response(status: u16, content_type: Option<&str>) -> HttpResponse {
        HttpResponse {
            status,
            content_type: content_type.map(str::to_string),
            body: Bytes::from_static(b"img"),
        }
    }

    #[test]
    fn test_build_url_encodes_query_and_shape() {
        let source =
            UpstreamTileSource::new(MockHttpClient::image("image/png", b""), "http://up.test/grid")
                .unwrap();
        let request = TileRequest::new("cats & dogs", 2, GridShape::new(4, 5).unwrap(), 9);

        let url = source.build_url(&request);
        assert_eq!(
            url.as_str(),
            "http://up.test/grid?q=cats+%26+dogs&page=2&cols=4&rows=5&i=9"
        );
    }

    #[test]
    fn test_build_url_keeps_existing_query() {
        let source = UpstreamTileSource::new(
            MockHttpClient::image("image/png", b""),
            "http://up.test/grid?quality=hq",
        )
        .unwrap();

        let url = source.build_url(&tile(0));
        assert!(url.as_str().starts_with("http://up.test/grid?quality=hq&q="));
    }

    #[test]
    fn test_new_rejects_bad_urls() {
        let client = || MockHttpClient::image("image/png", b"");
        assert!(matches!(
            UpstreamTileSource::new(client(), "not a url"),
            Err(UpstreamUrlError::Parse { .. })
        ));
        assert!(matches!(
            UpstreamTileSource::new(client(), "ftp://up.test/grid"),
            Err(UpstreamUrlError::Scheme(_))
        ));
    }

    #[test]
    fn test_validate_accepts_image() {
        let body = validate(0, response(200, Some("image/png"))).unwrap();
        assert_eq!(body, b"img");

        assert!(validate(0, response(204, Some("IMAGE/JPEG; charset=binary"))).is_ok());
    }

    #[test]
    fn test_validate_rejects_error_status() {
        assert_eq!(
            validate(7, response(404, Some("image/png"))),
            Err(FetchError::Status {
                index: 7,
                status: 404
            })
        );
        assert!(matches!(
            validate(1, response(500, None)),
            Err(FetchError::Status { status: 500, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_redirect() {
        assert_eq!(
            validate(3, response(302, Some("image/png"))),
            Err(FetchError::Redirect {
                index: 3,
                status: 302
            })
        );
    }

    #[test]
    fn test_validate_rejects_non_image_content() {
        assert_eq!(
            validate(4, response(200, Some("text/html"))),
            Err(FetchError::ContentType {
                index: 4,
                content_type: "text/html".to_string()
            })
        );
        assert_eq!(
            validate(4, response(200, None)),
            Err(FetchError::ContentType {
                index: 4,
                content_type: "<missing>".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_fetch_maps_transport_errors() {
        let timeout = UpstreamTileSource::new(
            MockHttpClient::answering(Err(TransportError::Timeout)),
            "http://up.test/grid",
        )
        .unwrap();
        assert_eq!(
            timeout.fetch(&tile(5)).await,
            Err(FetchError::Timeout { index: 5 })
        );

        let refused = UpstreamTileSource::new(
            MockHttpClient::answering(Err(TransportError::Failed("refused".to_string()))),
            "http://up.test/grid",
        )
        .unwrap();
        assert_eq!(
            refused.fetch(&tile(6)).await,
            Err(FetchError::Network {
                index: 6,
                reason: "refused".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_fetch_requests_built_url() {
        let source = UpstreamTileSource::new(
            MockHttpClient::image("image/png", b"png-bytes"),
            "http://up.test/grid",
        )
        .unwrap();

        let body = source.fetch(&tile(11)).await.unwrap();
        assert_eq!(body, b"png-bytes");
        assert_eq!(
            source.client.requested(),
            vec!["http://up.test/grid?q=cat+videos&page=0&cols=3&rows=4&i=11".to_string()]
        );
    }

    #[tokio::test]
    async fn test_fetch_against_http_upstream() {
        use httpmock::prelude::*;

        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/grid")
                    .query_param("q", "cat videos")
                    .query_param("i", "7");
                then.status(404);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/grid").query_param("i", "0");
                then.status(200)
                    .header("content-type", "image/png")
                    .body(b"tile-zero".to_vec());
            })
            .await;

        let source =
            UpstreamTileSource::new(ReqwestClient::new().unwrap(), &server.url("/grid")).unwrap();

        assert_eq!(source.fetch(&tile(0)).await.unwrap(), b"tile-zero");
        assert_eq!(
            source.fetch(&tile(7)).await,
            Err(FetchError::Status {
                index: 7,
                status: 404
            })
        );
    }
}

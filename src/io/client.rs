//! Carrier tracking fetch client
//!
//! Selects the carrier endpoint and request shape, performs the request via
//! the injected transport, and runs the matching page parser. Every failure
//! mode surfaces as `TrackingResult::Error` with a descriptive message.
//! The client never retries; retry policy belongs to the caller.

use crate::domain::{Carrier, TrackingResult};
use crate::io::transport::{CarrierRequest, RequestMethod, Transport};
use crate::parsers;
use std::sync::Arc;
use tracing::{debug, warn};

const YAMATO_URL: &str = "https://toi.kuronekoyamato.co.jp/cgi-bin/tneko";
const SAGAWA_URL: &str = "https://k2k.sagawa-exp.co.jp/p/web/okurijosearch.do";
const JAPAN_POST_URL: &str = "https://trackings.post.japanpost.jp/services/srv/search/direct";

/// Build the carrier-specific request for a tracking number. Pure; the
/// lookup is closed over the carrier tag.
pub fn build_request(carrier: Carrier, tracking_number: &str) -> CarrierRequest {
    match carrier {
        Carrier::Yamato => CarrierRequest {
            url: YAMATO_URL.to_string(),
            method: RequestMethod::PostForm(vec![(
                "number01".to_string(),
                tracking_number.to_string(),
            )]),
        },
        Carrier::Sagawa => CarrierRequest {
            url: SAGAWA_URL.to_string(),
            method: RequestMethod::PostForm(vec![(
                "okurijoNo".to_string(),
                tracking_number.to_string(),
            )]),
        },
        Carrier::JapanPost => CarrierRequest {
            url: format!(
                "{JAPAN_POST_URL}?requestNo1={tracking_number}&searchKind=S002&locale=ja"
            ),
            method: RequestMethod::Get,
        },
    }
}

/// Fetches and parses carrier tracking pages
pub struct TrackingClient {
    transport: Arc<dyn Transport>,
}

impl TrackingClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Fetch the tracking page for one parcel and parse it into a timeline.
    pub async fn track(&self, tracking_number: &str, carrier: Carrier) -> TrackingResult {
        let request = build_request(carrier, tracking_number);
        debug!(
            carrier = %carrier,
            tracking_number = %tracking_number,
            url = %request.url,
            "carrier_fetch"
        );

        let response = match self.transport.fetch(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(carrier = %carrier, tracking_number = %tracking_number, error = %e, "carrier_fetch_failed");
                return TrackingResult::Error(format!("request failed: {e:#}"));
            }
        };

        if !response.is_success() {
            return TrackingResult::Error(format!("HTTP {}", response.status));
        }
        if response.body.trim().is_empty() {
            return TrackingResult::Error("empty response body".to_string());
        }

        let timeline = parsers::parse(carrier, &response.body);
        if timeline.is_empty() {
            return TrackingResult::Error("no tracking data found".to_string());
        }

        debug!(carrier = %carrier, entries = timeline.len(), "carrier_fetch_parsed");
        TrackingResult::Success(timeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::transport::TransportResponse;
    use async_trait::async_trait;

    struct CannedTransport {
        status: u16,
        body: String,
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn fetch(&self, _request: &CarrierRequest) -> anyhow::Result<TransportResponse> {
            Ok(TransportResponse { status: self.status, body: self.body.clone() })
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        async fn fetch(&self, _request: &CarrierRequest) -> anyhow::Result<TransportResponse> {
            anyhow::bail!("connection timed out")
        }
    }

    fn client(status: u16, body: &str) -> TrackingClient {
        TrackingClient::new(Arc::new(CannedTransport { status, body: body.to_string() }))
    }

    const SAGAWA_PAGE: &str = r#"
        <table class="table_basic">
          <tr><td>集荷</td><td>8月1日 10:30</td><td>東京営業所</td></tr>
        </table>
    "#;

    #[test]
    fn test_request_shapes() {
        let yamato = build_request(Carrier::Yamato, "123456789012");
        assert_eq!(yamato.url, YAMATO_URL);
        assert!(matches!(
            &yamato.method,
            RequestMethod::PostForm(fields) if fields[0].0 == "number01"
        ));

        let sagawa = build_request(Carrier::Sagawa, "123456789012");
        assert!(matches!(
            &sagawa.method,
            RequestMethod::PostForm(fields) if fields[0].0 == "okurijoNo"
        ));

        let japan_post = build_request(Carrier::JapanPost, "EA123456789JP");
        assert_eq!(japan_post.method, RequestMethod::Get);
        assert!(japan_post.url.contains("requestNo1=EA123456789JP"));
    }

    #[tokio::test]
    async fn test_track_success() {
        let result = client(200, SAGAWA_PAGE).track("123456789012", Carrier::Sagawa).await;
        match result {
            TrackingResult::Success(timeline) => {
                assert_eq!(timeline.len(), 1);
                assert_eq!(timeline[0].status, "集荷");
            }
            TrackingResult::Error(message) => panic!("unexpected error: {message}"),
        }
    }

    #[tokio::test]
    async fn test_track_http_error() {
        let result = client(503, "error page").track("123456789012", Carrier::Sagawa).await;
        assert_eq!(result, TrackingResult::Error("HTTP 503".to_string()));
    }

    #[tokio::test]
    async fn test_track_empty_body() {
        let result = client(200, "  \n").track("123456789012", Carrier::Sagawa).await;
        assert_eq!(result, TrackingResult::Error("empty response body".to_string()));
    }

    #[tokio::test]
    async fn test_track_no_entries() {
        let result =
            client(200, "<html>該当なし</html>").track("123456789012", Carrier::Sagawa).await;
        assert_eq!(result, TrackingResult::Error("no tracking data found".to_string()));
    }

    #[tokio::test]
    async fn test_track_transport_failure() {
        let client = TrackingClient::new(Arc::new(FailingTransport));
        let result = client.track("123456789012", Carrier::Sagawa).await;
        match result {
            TrackingResult::Error(message) => assert!(message.contains("connection timed out")),
            TrackingResult::Success(_) => panic!("expected error"),
        }
    }
}

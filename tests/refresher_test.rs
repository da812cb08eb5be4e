//! Integration tests for refresh orchestration and transition detection

use async_trait::async_trait;
use parcel_tracker::domain::{Carrier, DeliveryId, TimelineEntry, TrackingResult};
use parcel_tracker::infra::store::{DeliveryStore, JsonFileStore, NewDelivery};
use parcel_tracker::io::transport::{
    CarrierRequest, RequestMethod, Transport, TransportResponse,
};
use parcel_tracker::io::{create_notify_channel, NotifyEvent, TrackingClient};
use parcel_tracker::services::Refresher;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;

/// Transport serving canned pages keyed by tracking number. Numbers with no
/// canned page fail like a dead connection.
#[derive(Default)]
struct PageTransport {
    pages: HashMap<String, String>,
}

impl PageTransport {
    fn with_page(mut self, tracking_number: &str, body: &str) -> Self {
        self.pages.insert(tracking_number.to_string(), body.to_string());
        self
    }
}

#[async_trait]
impl Transport for PageTransport {
    async fn fetch(&self, request: &CarrierRequest) -> anyhow::Result<TransportResponse> {
        let number = match &request.method {
            RequestMethod::PostForm(fields) => fields[0].1.clone(),
            RequestMethod::Get => {
                match self.pages.keys().find(|number| request.url.contains(*number)) {
                    Some(number) => number.clone(),
                    None => anyhow::bail!("connection refused"),
                }
            }
        };
        match self.pages.get(&number) {
            Some(body) => Ok(TransportResponse { status: 200, body: body.clone() }),
            None => anyhow::bail!("connection refused"),
        }
    }
}

/// Minimal Sagawa page with one structured row per (status, datetime, location)
fn sagawa_page(rows: &[(&str, &str, &str)]) -> String {
    let mut html = String::from(r#"<table class="table_basic">"#);
    for (status, datetime, location) in rows {
        html.push_str(&format!(
            "<tr><td>{status}</td><td>{datetime}</td><td>{location}</td></tr>"
        ));
    }
    html.push_str("</table>");
    html
}

fn entry(status: &str) -> TimelineEntry {
    TimelineEntry {
        status: status.to_string(),
        date: "8/1".to_string(),
        time: None,
        location: "東京営業所".to_string(),
    }
}

struct Fixture {
    _dir: TempDir,
    store: Arc<dyn DeliveryStore>,
    events: mpsc::Receiver<NotifyEvent>,
    refresher: Refresher,
}

/// Store in a temp dir + refresher wired to the given transport, with the
/// notification channel attached
async fn fixture(transport: PageTransport) -> Fixture {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn DeliveryStore> =
        Arc::new(JsonFileStore::open(dir.path().join("deliveries.json")).unwrap());
    let client = Arc::new(TrackingClient::new(Arc::new(transport)));
    let (sender, events) = create_notify_channel(16);
    let refresher = Refresher::new(Arc::clone(&store), client, Some(sender));
    Fixture { _dir: dir, store, events, refresher }
}

async fn add_delivery(
    store: &Arc<dyn DeliveryStore>,
    tracking_number: &str,
    timeline: &[TimelineEntry],
) -> DeliveryId {
    let id = store
        .insert(NewDelivery {
            tracking_number: tracking_number.to_string(),
            carrier: Carrier::Sagawa,
            memo: String::new(),
        })
        .await
        .unwrap();
    if !timeline.is_empty() {
        store.replace_timeline(id, timeline).await.unwrap();
    }
    id
}

#[tokio::test]
async fn test_refresh_one_replaces_timeline() {
    let transport = PageTransport::default().with_page(
        "100000000001",
        &sagawa_page(&[
            ("集荷", "8月1日 10:30", "東京営業所"),
            ("輸送中", "8月1日 22:00", "中継センター"),
        ]),
    );
    let mut fx = fixture(transport).await;
    let id = add_delivery(&fx.store, "100000000001", &[]).await;

    let result = fx.refresher.refresh_one(id).await;
    assert!(result.is_success());

    let item = fx.store.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(item.timeline.len(), 2);
    assert_eq!(item.latest_entry().unwrap().status, "輸送中");

    // First-ever refresh has no previous status; nothing fires
    assert!(fx.events.try_recv().is_err());
}

#[tokio::test]
async fn test_refresh_one_error_leaves_timeline_untouched() {
    let mut fx = fixture(PageTransport::default()).await;
    let id = add_delivery(&fx.store, "100000000001", &[entry("集荷")]).await;

    let result = fx.refresher.refresh_one(id).await;
    assert!(!result.is_success());

    let item = fx.store.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(item.timeline.len(), 1);
    assert_eq!(item.latest_entry().unwrap().status, "集荷");
    assert!(fx.events.try_recv().is_err());
}

#[tokio::test]
async fn test_refresh_one_unknown_id() {
    let fx = fixture(PageTransport::default()).await;
    match fx.refresher.refresh_one(DeliveryId(99)).await {
        TrackingResult::Error(message) => assert!(message.contains("not found")),
        TrackingResult::Success(_) => panic!("expected error"),
    }
}

#[tokio::test]
async fn test_refresh_all_isolates_failures() {
    // 3 tracking numbers resolve, 2 fail at the transport
    let transport = PageTransport::default()
        .with_page("100000000001", &sagawa_page(&[("集荷", "8月1日", "東京")]))
        .with_page("100000000003", &sagawa_page(&[("輸送中", "8月1日", "大阪")]))
        .with_page("100000000005", &sagawa_page(&[("配達完了", "8月2日", "福岡")]));
    let fx = fixture(transport).await;

    let mut ids = Vec::new();
    for n in 1..=5 {
        let number = format!("10000000000{n}");
        ids.push((number.clone(), add_delivery(&fx.store, &number, &[entry("荷物受付")]).await));
    }

    let results = fx.refresher.refresh_all().await;
    assert_eq!(results.len(), 5);

    // Every stored id appears exactly once, whatever the completion order
    let mut seen: Vec<DeliveryId> = results.iter().map(|(id, _)| *id).collect();
    seen.sort();
    let mut expected: Vec<DeliveryId> = ids.iter().map(|(_, id)| *id).collect();
    expected.sort();
    assert_eq!(seen, expected);

    let failures =
        results.iter().filter(|(_, result)| !result.is_success()).count();
    assert_eq!(failures, 2);

    // Only the three successful deliveries were mutated
    for (number, id) in &ids {
        let item = fx.store.get_by_id(*id).await.unwrap().unwrap();
        let latest = item.latest_entry().unwrap().status.clone();
        match number.as_str() {
            "100000000001" | "100000000003" | "100000000005" => {
                assert_ne!(latest, "荷物受付", "{number} not refreshed")
            }
            _ => assert_eq!(latest, "荷物受付", "{number} mutated"),
        }
    }
}

#[tokio::test]
async fn test_delivered_transition_fires_once() {
    let transport = PageTransport::default().with_page(
        "100000000001",
        &sagawa_page(&[
            ("配達中", "8月2日 9:00", "世田谷営業所"),
            ("配達完了", "8月2日 14:05", "世田谷営業所"),
        ]),
    );
    let mut fx = fixture(transport).await;
    let id = add_delivery(&fx.store, "100000000001", &[entry("配達中")]).await;

    assert!(fx.refresher.refresh_one(id).await.is_success());

    match fx.events.try_recv().unwrap() {
        NotifyEvent::Delivered { id: event_id, tracking_number, location } => {
            assert_eq!(event_id, id);
            assert_eq!(tracking_number, "1000-0000-0001");
            assert_eq!(location, "世田谷営業所");
        }
        other => panic!("expected delivered event, got {other:?}"),
    }
    assert!(fx.events.try_recv().is_err());

    // A repeat refresh still classifies as delivered; no new transition
    assert!(fx.refresher.refresh_one(id).await.is_success());
    assert!(fx.events.try_recv().is_err());
}

#[tokio::test]
async fn test_status_update_transition() {
    let transport = PageTransport::default().with_page(
        "100000000001",
        &sagawa_page(&[("配達中", "8月2日 9:00", "世田谷営業所")]),
    );
    let mut fx = fixture(transport).await;
    let id = add_delivery(&fx.store, "100000000001", &[entry("集荷")]).await;

    assert!(fx.refresher.refresh_one(id).await.is_success());

    match fx.events.try_recv().unwrap() {
        NotifyEvent::StatusChanged { id: event_id, status_label, .. } => {
            assert_eq!(event_id, id);
            assert_eq!(status_label, "配達中");
        }
        other => panic!("expected status change, got {other:?}"),
    }
}

#[tokio::test]
async fn test_transitions_without_sender_still_refresh() {
    let transport = PageTransport::default().with_page(
        "100000000001",
        &sagawa_page(&[("配達完了", "8月2日", "世田谷営業所")]),
    );
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn DeliveryStore> =
        Arc::new(JsonFileStore::open(dir.path().join("deliveries.json")).unwrap());
    let client = Arc::new(TrackingClient::new(Arc::new(transport)));
    // Notifications gated off: no sender at all
    let refresher = Refresher::new(Arc::clone(&store), client, None);

    let id = add_delivery(&store, "100000000001", &[entry("配達中")]).await;
    assert!(refresher.refresh_one(id).await.is_success());

    let item = store.get_by_id(id).await.unwrap().unwrap();
    assert!(item.is_delivered());
}

//! Durable delivery store
//!
//! Deliveries live in a single JSON document on disk, loaded into memory on
//! open and rewritten on every mutation. Each stored row carries its
//! timeline as an embedded JSON string; a timeline that fails to decode is
//! treated as empty rather than failing the whole store. Refresh tasks
//! mutate disjoint rows, so last-writer-wins per id is acceptable.

use crate::domain::{Carrier, DeliveryId, DeliveryItem, TimelineEntry};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Persisted row for one delivery
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DeliveryRow {
    id: i64,
    tracking_number: String,
    carrier: Carrier,
    #[serde(default = "default_timeline_json")]
    timeline_json: String,
    registered_at: String,
    #[serde(default)]
    memo: String,
}

fn default_timeline_json() -> String {
    "[]".to_string()
}

/// A delivery to insert; the store assigns the id and registration time
#[derive(Debug, Clone)]
pub struct NewDelivery {
    pub tracking_number: String,
    pub carrier: Carrier,
    pub memo: String,
}

#[async_trait]
pub trait DeliveryStore: Send + Sync {
    /// All deliveries, newest registration first
    async fn get_all(&self) -> anyhow::Result<Vec<DeliveryItem>>;
    async fn get_by_id(&self, id: DeliveryId) -> anyhow::Result<Option<DeliveryItem>>;
    async fn get_by_tracking_number(
        &self,
        tracking_number: &str,
        carrier: Carrier,
    ) -> anyhow::Result<Option<DeliveryItem>>;
    async fn insert(&self, delivery: NewDelivery) -> anyhow::Result<DeliveryId>;
    /// Replace the whole timeline for one delivery. Unknown ids are a no-op.
    async fn replace_timeline(
        &self,
        id: DeliveryId,
        timeline: &[TimelineEntry],
    ) -> anyhow::Result<()>;
    async fn delete(&self, id: DeliveryId) -> anyhow::Result<()>;
    async fn delete_all(&self) -> anyhow::Result<()>;
    async fn count(&self) -> anyhow::Result<usize>;
}

struct Inner {
    rows: BTreeMap<i64, DeliveryRow>,
    next_id: i64,
}

/// JSON-file-backed delivery store
pub struct JsonFileStore {
    path: PathBuf,
    inner: RwLock<Inner>,
}

impl JsonFileStore {
    /// Open a store file, starting empty if the file does not exist yet
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let rows: Vec<DeliveryRow> = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read store file {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse store file {}", path.display()))?
        } else {
            Vec::new()
        };

        let next_id = rows.iter().map(|row| row.id).max().unwrap_or(0) + 1;
        info!(path = %path.display(), deliveries = rows.len(), "store_opened");

        let rows = rows.into_iter().map(|row| (row.id, row)).collect();
        Ok(Self { path, inner: RwLock::new(Inner { rows, next_id }) })
    }

    fn persist(&self, inner: &Inner) -> anyhow::Result<()> {
        let rows: Vec<&DeliveryRow> = inner.rows.values().collect();
        let json = serde_json::to_string_pretty(&rows).context("Failed to encode store")?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write store file {}", self.path.display()))?;

        debug!(path = %self.path.display(), deliveries = rows.len(), "store_persisted");
        Ok(())
    }
}

/// Decode a stored row into the domain aggregate. Lenient on purpose: a
/// corrupt timeline or registration date degrades, it never errors.
fn row_to_item(row: &DeliveryRow) -> DeliveryItem {
    let timeline: Vec<TimelineEntry> = match serde_json::from_str(&row.timeline_json) {
        Ok(timeline) => timeline,
        Err(e) => {
            warn!(id = row.id, error = %e, "timeline_decode_failed");
            Vec::new()
        }
    };

    let registered_at = row
        .registered_at
        .parse::<DateTime<Utc>>()
        .unwrap_or_else(|_| Utc::now());

    DeliveryItem {
        id: DeliveryId(row.id),
        tracking_number: row.tracking_number.clone(),
        carrier: row.carrier,
        timeline,
        registered_at,
        memo: row.memo.clone(),
    }
}

#[async_trait]
impl DeliveryStore for JsonFileStore {
    async fn get_all(&self) -> anyhow::Result<Vec<DeliveryItem>> {
        let inner = self.inner.read();
        let mut items: Vec<DeliveryItem> = inner.rows.values().map(row_to_item).collect();
        items.sort_by(|a, b| b.registered_at.cmp(&a.registered_at).then(b.id.cmp(&a.id)));
        Ok(items)
    }

    async fn get_by_id(&self, id: DeliveryId) -> anyhow::Result<Option<DeliveryItem>> {
        let inner = self.inner.read();
        Ok(inner.rows.get(&id.0).map(row_to_item))
    }

    async fn get_by_tracking_number(
        &self,
        tracking_number: &str,
        carrier: Carrier,
    ) -> anyhow::Result<Option<DeliveryItem>> {
        let inner = self.inner.read();
        Ok(inner
            .rows
            .values()
            .find(|row| row.tracking_number == tracking_number && row.carrier == carrier)
            .map(row_to_item))
    }

    async fn insert(&self, delivery: NewDelivery) -> anyhow::Result<DeliveryId> {
        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.rows.insert(
            id,
            DeliveryRow {
                id,
                tracking_number: delivery.tracking_number,
                carrier: delivery.carrier,
                timeline_json: default_timeline_json(),
                registered_at: Utc::now().to_rfc3339(),
                memo: delivery.memo,
            },
        );
        self.persist(&inner)?;
        Ok(DeliveryId(id))
    }

    async fn replace_timeline(
        &self,
        id: DeliveryId,
        timeline: &[TimelineEntry],
    ) -> anyhow::Result<()> {
        let json = serde_json::to_string(timeline).context("Failed to encode timeline")?;
        let mut inner = self.inner.write();
        match inner.rows.get_mut(&id.0) {
            Some(row) => row.timeline_json = json,
            None => {
                warn!(id = %id, "timeline_replace_unknown_id");
                return Ok(());
            }
        }
        self.persist(&inner)
    }

    async fn delete(&self, id: DeliveryId) -> anyhow::Result<()> {
        let mut inner = self.inner.write();
        if inner.rows.remove(&id.0).is_some() {
            self.persist(&inner)?;
        }
        Ok(())
    }

    async fn delete_all(&self) -> anyhow::Result<()> {
        let mut inner = self.inner.write();
        inner.rows.clear();
        self.persist(&inner)
    }

    async fn count(&self) -> anyhow::Result<usize> {
        Ok(self.inner.read().rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_delivery(tracking_number: &str) -> NewDelivery {
        NewDelivery {
            tracking_number: tracking_number.to_string(),
            carrier: Carrier::Yamato,
            memo: String::new(),
        }
    }

    fn entry(status: &str) -> TimelineEntry {
        TimelineEntry {
            status: status.to_string(),
            date: "8/1".to_string(),
            time: Some("10:30".to_string()),
            location: "東京".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("deliveries.json")).unwrap();

        let id = store.insert(new_delivery("123456789012")).await.unwrap();
        let item = store.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(item.tracking_number, "123456789012");
        assert!(item.timeline.is_empty());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_replace_timeline_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("deliveries.json")).unwrap();

        let id = store.insert(new_delivery("123456789012")).await.unwrap();
        store.replace_timeline(id, &[entry("集荷"), entry("配達完了")]).await.unwrap();

        let item = store.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(item.timeline.len(), 2);
        assert_eq!(item.latest_entry().unwrap().status, "配達完了");
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deliveries.json");

        let id = {
            let store = JsonFileStore::open(&path).unwrap();
            let id = store.insert(new_delivery("123456789012")).await.unwrap();
            store.replace_timeline(id, &[entry("集荷")]).await.unwrap();
            id
        };

        let reopened = JsonFileStore::open(&path).unwrap();
        let item = reopened.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(item.timeline.len(), 1);

        // Ids keep counting up after a reopen
        let next = reopened.insert(new_delivery("123456789013")).await.unwrap();
        assert!(next.0 > id.0);
    }

    #[tokio::test]
    async fn test_corrupt_timeline_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deliveries.json");
        fs::write(
            &path,
            r#"[{
                "id": 1,
                "tracking_number": "123456789012",
                "carrier": "yamato",
                "timeline_json": "{not json",
                "registered_at": "2026-08-01T00:00:00Z"
            }]"#,
        )
        .unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        let item = store.get_by_id(DeliveryId(1)).await.unwrap().unwrap();
        assert!(item.timeline.is_empty());
    }

    #[tokio::test]
    async fn test_get_by_tracking_number_and_delete() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("deliveries.json")).unwrap();

        let id = store.insert(new_delivery("123456789012")).await.unwrap();
        let found = store
            .get_by_tracking_number("123456789012", Carrier::Yamato)
            .await
            .unwrap();
        assert_eq!(found.map(|item| item.id), Some(id));

        assert!(store
            .get_by_tracking_number("123456789012", Carrier::Sagawa)
            .await
            .unwrap()
            .is_none());

        store.delete(id).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);

        store.insert(new_delivery("1")).await.unwrap();
        store.insert(new_delivery("2")).await.unwrap();
        store.delete_all().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }
}

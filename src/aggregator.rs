use {
    crate::{
        catalog::Catalog,
        store::{in_store_order, LogStore, Snapshot, StoreError},
    },
    serde::Serialize,
    std::{collections::HashMap, sync::Arc},
};

/// Priced count of one item in the trolley
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemSummaryRow {
    pub item_name: String,
    pub quantity: u64,
    pub unit_price: u64,
    pub total_price: u64,
}

/// Result of one aggregation pass
///
/// Rows are sorted by descending quantity, ties by item name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub rows: Vec<ItemSummaryRow>,
    /// Sum of `qty` over recognized scans
    pub total_items: u64,
    pub total_bill: u64,
    /// Scans whose tag is not in the catalog
    pub unrecognized_events: usize,
}

impl Summary {
    /// Quantity of an item, 0 when it was not scanned
    pub fn quantity_of(&self, item_name: &str) -> u64 {
        self.rows
            .iter()
            .find(|row| row.item_name == item_name)
            .map(|row| row.quantity)
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Store keys of the scans behind each item, in snapshot order
///
/// Holds one key per scan record, however large its `qty`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyIndex {
    keys: HashMap<String, Vec<String>>,
}

impl KeyIndex {
    pub fn keys_for(&self, item_name: &str) -> &[String] {
        self.keys.get(item_name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Removal candidate: the first key seen for the item
    pub fn first_key(&self, item_name: &str) -> Option<&str> {
        self.keys_for(item_name).first().map(String::as_str)
    }

    fn push(&mut self, item_name: &str, key: &str) {
        self.keys
            .entry(item_name.to_string())
            .or_default()
            .push(key.to_string());
    }
}

/// Reduce a snapshot to a priced summary and a removal index
///
/// Pure: the same snapshot always yields the same result. Scans with an
/// unknown or missing tag only bump `unrecognized_events`. Records are
/// visited in store order and totals saturate at `u64::MAX`.
pub fn summarize(catalog: &Catalog, events: &Snapshot) -> (Summary, KeyIndex) {
    let mut quantities: HashMap<&str, u64> = HashMap::new();
    let mut key_index = KeyIndex::default();
    let mut unrecognized_events = 0;

    for (key, event) in in_store_order(events) {
        let item_name = event
            .tag
            .as_deref()
            .and_then(|tag| catalog.tags().item_for_tag(tag));

        let Some(item_name) = item_name else {
            unrecognized_events += 1;
            continue;
        };

        let quantity = quantities.entry(item_name).or_default();
        *quantity = quantity.saturating_add(u64::from(event.qty));
        key_index.push(item_name, key);
    }

    let mut rows: Vec<ItemSummaryRow> = quantities
        .into_iter()
        .filter(|(_, quantity)| *quantity > 0)
        .map(|(item_name, quantity)| {
            let unit_price = catalog.prices().unit_price(item_name);
            ItemSummaryRow {
                item_name: item_name.to_string(),
                quantity,
                unit_price,
                total_price: quantity.saturating_mul(unit_price),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then_with(|| a.item_name.cmp(&b.item_name))
    });

    let summary = Summary {
        total_items: rows
            .iter()
            .fold(0u64, |acc, row| acc.saturating_add(row.quantity)),
        total_bill: rows
            .iter()
            .fold(0u64, |acc, row| acc.saturating_add(row.total_price)),
        rows,
        unrecognized_events,
    };

    (summary, key_index)
}

/// Outcome of a removal request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    /// One scan record was deleted
    Removed { key: String },
    /// No tracked scan for the item; the store was not touched
    NothingToRemove,
}

/// Reads the scan log, summarizes it and removes single scans
pub struct Aggregator {
    store: Arc<dyn LogStore>,
    catalog: Arc<Catalog>,
}

impl Aggregator {
    pub fn new(store: Arc<dyn LogStore>, catalog: Arc<Catalog>) -> Self {
        Self { store, catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &dyn LogStore {
        self.store.as_ref()
    }

    /// Fetch the current snapshot and summarize it
    ///
    /// A failed read is returned before any aggregation happens.
    pub async fn fetch_and_summarize(&self) -> Result<(Summary, KeyIndex), StoreError> {
        let snapshot = self.store.get_all().await?;
        let (summary, key_index) = summarize(&self.catalog, &snapshot);

        log::debug!(
            "Summarized {} scans: {} items, bill {}, {} unrecognized",
            snapshot.len(),
            summary.total_items,
            summary.total_bill,
            summary.unrecognized_events
        );
        Ok((summary, key_index))
    }

    /// Delete one scan record for `item_name`
    ///
    /// Picks the first key recorded in `key_index` and deletes that whole
    /// record, so an item scanned with `qty` 3 drops by 3. Store errors are
    /// returned as-is without retrying; the next fetch shows what happened.
    pub async fn delete_one(
        &self,
        item_name: &str,
        key_index: &KeyIndex,
    ) -> Result<Removal, StoreError> {
        if !self.catalog.tags().contains_item(item_name) {
            log::warn!("Ignoring removal of unknown item '{}'", item_name);
            return Ok(Removal::NothingToRemove);
        }

        let Some(key) = key_index.first_key(item_name) else {
            log::debug!("No tracked scans for '{}', nothing to remove", item_name);
            return Ok(Removal::NothingToRemove);
        };

        self.store.delete(key).await?;
        log::info!("Removed one {} (record {})", item_name, key);

        Ok(Removal::Removed {
            key: key.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            catalog::CatalogItem,
            store::{MemoryLogStore, ScanEvent},
        },
        async_trait::async_trait,
        std::sync::atomic::{AtomicUsize, Ordering},
    };

    const LAYS: &str = "5000371CDAA1";
    const APPLE: &str = "50002911EB83";
    const MILK: &str = "50002DEDD646";

    fn snapshot(events: &[(&str, Option<&str>, u32)]) -> Snapshot {
        events
            .iter()
            .map(|(key, tag, qty)| {
                (
                    key.to_string(),
                    ScanEvent {
                        tag: tag.map(str::to_string),
                        qty: *qty,
                    },
                )
            })
            .collect()
    }

    /// Store that reads fine but refuses every delete
    struct ReadOnlyLogStore {
        records: Snapshot,
        deletes: AtomicUsize,
    }

    #[async_trait]
    impl LogStore for ReadOnlyLogStore {
        async fn get_all(&self) -> Result<Snapshot, StoreError> {
            Ok(self.records.clone())
        }

        async fn delete(&self, _key: &str) -> Result<(), StoreError> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Status {
                status: 503,
                body: "service unavailable".to_string(),
            })
        }

        fn describe(&self) -> String {
            "read-only".to_string()
        }
    }

    fn row(item_name: &str, quantity: u64, unit_price: u64) -> ItemSummaryRow {
        ItemSummaryRow {
            item_name: item_name.to_string(),
            quantity,
            unit_price,
            total_price: quantity * unit_price,
        }
    }

    #[test]
    fn test_empty_snapshot() {
        let (summary, key_index) = summarize(&Catalog::reference(), &Snapshot::new());

        assert_eq!(summary, Summary::default());
        assert_eq!(key_index, KeyIndex::default());
    }

    #[test]
    fn test_only_unrecognized_tags() {
        let events = snapshot(&[("k1", Some("UNKNOWN"), 5), ("k2", None, 2)]);

        let (summary, key_index) = summarize(&Catalog::reference(), &events);

        assert!(summary.rows.is_empty());
        assert_eq!(summary.total_items, 0);
        assert_eq!(summary.total_bill, 0);
        assert_eq!(summary.unrecognized_events, 2);
        assert!(key_index.keys_for("Lays").is_empty());
    }

    #[test]
    fn test_mixed_snapshot() {
        let events = snapshot(&[
            ("k1", Some(LAYS), 2),
            ("k2", Some("UNKNOWN"), 5),
            ("k3", Some(APPLE), 1),
        ]);

        let (summary, key_index) = summarize(&Catalog::reference(), &events);

        assert_eq!(summary.rows, vec![row("Lays", 2, 50), row("Apple", 1, 30)]);
        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.total_bill, 130);
        assert_eq!(summary.unrecognized_events, 1);
        assert_eq!(key_index.keys_for("Lays"), ["k1".to_string()]);
        assert_eq!(key_index.keys_for("Apple"), ["k3".to_string()]);
    }

    #[test]
    fn test_one_key_per_event_in_snapshot_order() {
        let events = snapshot(&[
            ("k3", Some(MILK), 1),
            ("k1", Some(MILK), 3),
            ("k2", Some(APPLE), 1),
        ]);

        let (summary, key_index) = summarize(&Catalog::reference(), &events);

        assert_eq!(summary.quantity_of("Milk"), 4);
        assert_eq!(
            key_index.keys_for("Milk"),
            ["k1".to_string(), "k3".to_string()]
        );
        assert_eq!(key_index.first_key("Milk"), Some("k1"));
    }

    #[test]
    fn test_integer_keys_index_numerically() {
        let events = snapshot(&[
            ("10", Some(APPLE), 1),
            ("2", Some(APPLE), 1),
            ("-NxA1", Some(APPLE), 1),
        ]);

        let (_, key_index) = summarize(&Catalog::reference(), &events);

        assert_eq!(
            key_index.keys_for("Apple"),
            ["2".to_string(), "10".to_string(), "-NxA1".to_string()]
        );
        assert_eq!(key_index.first_key("Apple"), Some("2"));
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let price = u64::MAX / 2 + 1;
        let catalog = Catalog::new(
            "PKR",
            vec![
                CatalogItem::new(LAYS, "Lays", price, "🥔"),
                CatalogItem::new(APPLE, "Apple", price, "🍎"),
            ],
        )
        .unwrap();
        let events = snapshot(&[("k1", Some(LAYS), 2), ("k2", Some(APPLE), 1)]);

        let (summary, _) = summarize(&catalog, &events);

        assert_eq!(summary.rows[0].total_price, u64::MAX);
        assert_eq!(summary.rows[1].total_price, price);
        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.total_bill, u64::MAX);
    }

    #[test]
    fn test_rows_sorted_by_quantity_then_name() {
        let events = snapshot(&[
            ("k1", Some(MILK), 1),
            ("k2", Some(APPLE), 1),
            ("k3", Some(LAYS), 4),
        ]);

        let (summary, _) = summarize(&Catalog::reference(), &events);

        let names: Vec<&str> = summary.rows.iter().map(|r| r.item_name.as_str()).collect();
        assert_eq!(names, vec!["Lays", "Apple", "Milk"]);
    }

    #[test]
    fn test_zero_quantity_scan_is_indexed_but_not_shown() {
        let events = snapshot(&[("k1", Some(APPLE), 0)]);

        let (summary, key_index) = summarize(&Catalog::reference(), &events);

        assert!(summary.rows.is_empty());
        assert_eq!(summary.total_items, 0);
        assert_eq!(key_index.first_key("Apple"), Some("k1"));
    }

    #[test]
    fn test_unpriced_item_counts_but_bills_zero() {
        let catalog = Catalog::new(
            "PKR",
            vec![
                CatalogItem::new(LAYS, "Lays", 50, "🥔"),
                CatalogItem {
                    tag: "AABBCCDDEEFF".to_string(),
                    name: "Sample".to_string(),
                    price: None,
                    icon: None,
                },
            ],
        )
        .unwrap();
        let events = snapshot(&[("k1", Some("AABBCCDDEEFF"), 3), ("k2", Some(LAYS), 1)]);

        let (summary, _) = summarize(&catalog, &events);

        assert_eq!(summary.rows, vec![row("Sample", 3, 0), row("Lays", 1, 50)]);
        assert_eq!(summary.total_items, 4);
        assert_eq!(summary.total_bill, 50);
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let catalog = Catalog::reference();
        let events = snapshot(&[("k1", Some(LAYS), 2), ("k2", Some(MILK), 1)]);

        assert_eq!(summarize(&catalog, &events), summarize(&catalog, &events));
    }

    #[tokio::test]
    async fn test_delete_one_removes_whole_record() {
        let store = Arc::new(MemoryLogStore::with_events([
            ("k1", ScanEvent::new(LAYS, 5)),
            ("k2", ScanEvent::new(LAYS, 1)),
        ]));
        let aggregator = Aggregator::new(store.clone(), Arc::new(Catalog::reference()));

        let (summary, key_index) = aggregator.fetch_and_summarize().await.unwrap();
        assert_eq!(summary.quantity_of("Lays"), 6);

        let removal = aggregator.delete_one("Lays", &key_index).await.unwrap();
        assert_eq!(removal, Removal::Removed { key: "k1".to_string() });

        let (summary, _) = aggregator.fetch_and_summarize().await.unwrap();
        assert_eq!(summary.quantity_of("Lays"), 1);
        assert_eq!(store.delete_calls(), 1);
    }

    #[tokio::test]
    async fn test_delete_one_without_keys_is_noop() {
        let store = Arc::new(MemoryLogStore::with_events([("k1", ScanEvent::new(APPLE, 1))]));
        let aggregator = Aggregator::new(store.clone(), Arc::new(Catalog::reference()));
        let (_, key_index) = aggregator.fetch_and_summarize().await.unwrap();

        let missing = aggregator.delete_one("Milk", &key_index).await.unwrap();
        let unknown = aggregator.delete_one("Bread", &key_index).await.unwrap();

        assert_eq!(missing, Removal::NothingToRemove);
        assert_eq!(unknown, Removal::NothingToRemove);
        assert_eq!(store.delete_calls(), 0);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_stale_index_delete_is_tolerated() {
        let store = Arc::new(MemoryLogStore::with_events([("k1", ScanEvent::new(APPLE, 1))]));
        let aggregator = Aggregator::new(store.clone(), Arc::new(Catalog::reference()));
        let (_, key_index) = aggregator.fetch_and_summarize().await.unwrap();

        store.delete("k1").await.unwrap();
        store.insert("k9", ScanEvent::new(APPLE, 1)).await;

        let removal = aggregator.delete_one("Apple", &key_index).await.unwrap();
        assert_eq!(removal, Removal::Removed { key: "k1".to_string() });

        let (summary, _) = aggregator.fetch_and_summarize().await.unwrap();
        assert_eq!(summary.quantity_of("Apple"), 1);
    }

    #[tokio::test]
    async fn test_delete_one_returns_store_error_without_retry() {
        let store = Arc::new(ReadOnlyLogStore {
            records: snapshot(&[("k1", Some(APPLE), 1), ("k2", Some(APPLE), 1)]),
            deletes: AtomicUsize::new(0),
        });
        let aggregator = Aggregator::new(store.clone(), Arc::new(Catalog::reference()));
        let (_, key_index) = aggregator.fetch_and_summarize().await.unwrap();

        let result = aggregator.delete_one("Apple", &key_index).await;

        assert!(matches!(
            result,
            Err(StoreError::Status { status: 503, .. })
        ));
        assert_eq!(store.deletes.load(Ordering::SeqCst), 1);

        let (summary, _) = aggregator.fetch_and_summarize().await.unwrap();
        assert_eq!(summary.quantity_of("Apple"), 2);
    }
}

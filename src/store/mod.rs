//! Scan log store backends
//!
//! The dashboard only needs two operations from the store holding the RFID
//! scan log: read the whole collection and delete one record by key.
//!
//! ```text
//! LogStore (trait)
//!     ├── FirebaseLogStore  (Realtime Database REST API)
//!     ├── FileLogStore      (local JSON file, same shape)
//!     └── MemoryLogStore    (in-process)
//! ```
//!
//! All backends share the same record shape:
//!
//! ```json
//! { "-NxA1": { "tag": "5000371CDAA1", "qty": 2 }, "-NxA2": { "tag": "50002911EB83" } }
//! ```

pub mod file;
pub mod firebase;
pub mod memory;

pub use file::FileLogStore;
pub use firebase::FirebaseLogStore;
pub use memory::MemoryLogStore;

use {
    crate::config::StoreBackend,
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
    serde_json::Value,
    std::{cmp::Ordering, collections::BTreeMap, sync::Arc},
};

/// One scan of an RFID tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanEvent {
    /// Missing tags never resolve to an item
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default = "default_qty")]
    pub qty: u32,
}

fn default_qty() -> u32 {
    1
}

impl ScanEvent {
    pub fn new(tag: &str, qty: u32) -> Self {
        Self {
            tag: Some(tag.to_string()),
            qty,
        }
    }
}

/// Full contents of the scan log at one point in time
///
/// Map order is plain string order; use `in_store_order` to walk records
/// the way the store lists them.
pub type Snapshot = BTreeMap<String, ScanEvent>;

/// Records in store order: integer keys first by value, then the rest by string
pub fn in_store_order(snapshot: &Snapshot) -> Vec<(&str, &ScanEvent)> {
    let mut records: Vec<(&str, &ScanEvent)> = snapshot
        .iter()
        .map(|(key, event)| (key.as_str(), event))
        .collect();
    records.sort_by(|(a, _), (b, _)| compare_store_keys(a, b));
    records
}

/// Key ordering used by the Realtime Database when listing children
pub fn compare_store_keys(a: &str, b: &str) -> Ordering {
    match (integer_key(a), integer_key(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Keys in canonical 32-bit integer form ("7", "-3"; not "07" or "+7")
fn integer_key(key: &str) -> Option<i32> {
    let value = key.parse::<i32>().ok()?;
    (value.to_string() == key).then_some(value)
}

#[derive(Debug)]
pub enum StoreError {
    Http(reqwest::Error),
    Status { status: u16, body: String },
    Io(std::io::Error),
    Serialization(serde_json::Error),
    UnexpectedShape(String),
    InvalidKey(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Http(err)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Http(e) => write!(f, "HTTP error: {}", e),
            StoreError::Status { status, body } => {
                write!(f, "Store returned status {}: {}", status, body)
            }
            StoreError::Io(e) => write!(f, "IO error: {}", e),
            StoreError::Serialization(e) => write!(f, "Serialization error: {}", e),
            StoreError::UnexpectedShape(kind) => {
                write!(f, "Expected a collection of scan records, got {}", kind)
            }
            StoreError::InvalidKey(key) => write!(f, "Invalid record key: {:?}", key),
        }
    }
}

impl std::error::Error for StoreError {}

/// Backend trait for the scan log
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Read every scan record; an empty store yields an empty snapshot
    async fn get_all(&self) -> Result<Snapshot, StoreError>;

    /// Remove exactly one record; deleting an absent key succeeds
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Human-readable location for logs and the status bar
    fn describe(&self) -> String;
}

/// Open the backend selected in configuration
pub fn open(backend: &StoreBackend) -> Result<Arc<dyn LogStore>, StoreError> {
    let store: Arc<dyn LogStore> = match backend {
        StoreBackend::Firebase(config) => Arc::new(FirebaseLogStore::new(config)?),
        StoreBackend::File(path) => Arc::new(FileLogStore::new(path)),
    };
    Ok(store)
}

/// Decode a raw collection into a snapshot
///
/// `null` is an empty collection. Arrays appear when every key is a small
/// integer; their indices become keys and holes are skipped. Records that
/// do not decode are logged and left out.
pub fn decode_snapshot(value: Value) -> Result<Snapshot, StoreError> {
    let entries: Vec<(String, Value)> = match value {
        Value::Null => return Ok(Snapshot::new()),
        Value::Object(map) => map.into_iter().collect(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        Value::Bool(_) => return Err(StoreError::UnexpectedShape("a boolean".to_string())),
        Value::Number(_) => return Err(StoreError::UnexpectedShape("a number".to_string())),
        Value::String(_) => return Err(StoreError::UnexpectedShape("a string".to_string())),
    };

    let mut snapshot = Snapshot::new();
    for (key, raw) in entries {
        match serde_json::from_value::<ScanEvent>(raw) {
            Ok(event) => {
                snapshot.insert(key, event);
            }
            Err(e) => {
                log::warn!("Skipping malformed scan record {}: {}", key, e);
            }
        }
    }
    Ok(snapshot)
}

/// Reject keys that would escape the collection path
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    const FORBIDDEN: &[char] = &['/', '.', '#', '$', '[', ']'];

    if key.is_empty() || key.contains(FORBIDDEN) {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

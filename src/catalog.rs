//! Tag catalog and price table
//!
//! Static configuration loaded once at startup:
//! - `TagCatalog`: injective tag ⇄ item name mapping
//! - `PriceTable`: item name → unit price (missing entries price at 0)
//!
//! Both are immutable after construction and shared behind an `Arc`.
//!
//! ## Catalog file
//!
//! ```json
//! {
//!   "currency": "PKR",
//!   "items": [
//!     { "tag": "5000371CDAA1", "name": "Lays", "price": 50, "icon": "🥔" }
//!   ]
//! }
//! ```

use {
    serde::{Deserialize, Serialize},
    std::{
        collections::{HashMap, HashSet},
        fs,
        path::Path,
    },
};

/// Number of hex digits in a tag identifier
pub const TAG_HEX_LEN: usize = 12;

#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    InvalidTag(String),
    DuplicateTag(String),
    DuplicateItem(String),
    Empty,
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Io(err)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Parse(err)
    }
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Io(e) => write!(f, "IO error: {}", e),
            CatalogError::Parse(e) => write!(f, "Parse error: {}", e),
            CatalogError::InvalidTag(tag) => write!(
                f,
                "Invalid tag '{}': expected {} hex digits",
                tag, TAG_HEX_LEN
            ),
            CatalogError::DuplicateTag(tag) => write!(f, "Tag listed twice: {}", tag),
            CatalogError::DuplicateItem(name) => write!(f, "Item listed twice: {}", name),
            CatalogError::Empty => write!(f, "Catalog has no items"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// One catalog entry as it appears in the catalog file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub tag: String,
    pub name: String,
    /// Unit price; an item without one is counted but priced at 0
    #[serde(default)]
    pub price: Option<u64>,
    /// Short label shown next to the item on metric tiles
    #[serde(default)]
    pub icon: Option<String>,
}

impl CatalogItem {
    pub fn new(tag: &str, name: &str, price: u64, icon: &str) -> Self {
        Self {
            tag: tag.to_string(),
            name: name.to_string(),
            price: Some(price),
            icon: Some(icon.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default = "default_currency")]
    currency: String,
    items: Vec<CatalogItem>,
}

fn default_currency() -> String {
    "PKR".to_string()
}

/// Bidirectional tag ⇄ item name mapping
#[derive(Debug, Clone, Default)]
pub struct TagCatalog {
    item_by_tag: HashMap<String, String>,
    tag_by_item: HashMap<String, String>,
    /// Item names in catalog order
    items: Vec<String>,
}

impl TagCatalog {
    /// Resolve a scanned tag to its item name (tags compare case-insensitively)
    pub fn item_for_tag(&self, tag: &str) -> Option<&str> {
        self.item_by_tag
            .get(&normalize_tag(tag))
            .map(String::as_str)
    }

    pub fn tag_for_item(&self, item_name: &str) -> Option<&str> {
        self.tag_by_item.get(item_name).map(String::as_str)
    }

    pub fn contains_item(&self, item_name: &str) -> bool {
        self.tag_by_item.contains_key(item_name)
    }

    /// Item names in catalog order
    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Item name → unit price
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    prices: HashMap<String, u64>,
}

impl PriceTable {
    /// Unit price for an item, 0 when the item has no entry
    pub fn unit_price(&self, item_name: &str) -> u64 {
        self.prices.get(item_name).copied().unwrap_or(0)
    }

    pub fn contains(&self, item_name: &str) -> bool {
        self.prices.contains_key(item_name)
    }
}

/// Tag catalog, price table and display labels for one deployment
#[derive(Debug, Clone)]
pub struct Catalog {
    tags: TagCatalog,
    prices: PriceTable,
    icons: HashMap<String, String>,
    currency: String,
}

impl Catalog {
    /// Build a validated catalog
    ///
    /// Rejects malformed tags and duplicate tags or item names so that the
    /// tag mapping stays injective.
    pub fn new(currency: &str, items: Vec<CatalogItem>) -> Result<Self, CatalogError> {
        if items.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen_tags = HashSet::new();
        let mut seen_items = HashSet::new();
        for item in &items {
            if !is_valid_tag(&item.tag) {
                return Err(CatalogError::InvalidTag(item.tag.clone()));
            }
            if !seen_tags.insert(normalize_tag(&item.tag)) {
                return Err(CatalogError::DuplicateTag(item.tag.clone()));
            }
            if !seen_items.insert(item.name.as_str()) {
                return Err(CatalogError::DuplicateItem(item.name.clone()));
            }
            if item.price.is_none() {
                log::warn!("Catalog item '{}' has no price, billing it at 0", item.name);
            }
        }

        Ok(Self::index(currency, items))
    }

    /// Reference deployment: five grocery items priced in PKR
    pub fn reference() -> Self {
        Self::index(
            "PKR",
            vec![
                CatalogItem::new("50002911EB83", "Apple", 30, "🍎"),
                CatalogItem::new("5000371CDAA1", "Lays", 50, "🥔"),
                CatalogItem::new("50002E1598F3", "Biscuit", 20, "🍪"),
                CatalogItem::new("50002B9CAE49", "Ice cream", 100, "🍦"),
                CatalogItem::new("50002DEDD646", "Milk", 60, "🥛"),
            ],
        )
    }

    /// Load and validate a catalog file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&json)?;

        log::info!(
            "Loaded catalog with {} items from {}",
            catalog.tags.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(&file.currency, file.items)
    }

    fn index(currency: &str, items: Vec<CatalogItem>) -> Self {
        let mut tags = TagCatalog::default();
        let mut prices = PriceTable::default();
        let mut icons = HashMap::new();

        for item in items {
            let tag = normalize_tag(&item.tag);
            tags.item_by_tag.insert(tag.clone(), item.name.clone());
            tags.tag_by_item.insert(item.name.clone(), tag);
            tags.items.push(item.name.clone());
            if let Some(price) = item.price {
                prices.prices.insert(item.name.clone(), price);
            }
            if let Some(icon) = item.icon {
                icons.insert(item.name, icon);
            }
        }

        Self {
            tags,
            prices,
            icons,
            currency: currency.to_string(),
        }
    }

    pub fn tags(&self) -> &TagCatalog {
        &self.tags
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    pub fn icon(&self, item_name: &str) -> Option<&str> {
        self.icons.get(item_name).map(String::as_str)
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().to_ascii_uppercase()
}

fn is_valid_tag(tag: &str) -> bool {
    let tag = tag.trim();
    tag.len() == TAG_HEX_LEN && hex::decode(tag).is_ok()
}

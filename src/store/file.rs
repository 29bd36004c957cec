//! Local JSON file backend
//!
//! Keeps the scan log in a single JSON object with the same shape as the
//! remote collection. A missing or blank file is an empty log.

use {
    super::{decode_snapshot, LogStore, Snapshot, StoreError},
    async_trait::async_trait,
    serde_json::Value,
    std::path::{Path, PathBuf},
    tokio::fs,
};

pub struct FileLogStore {
    path: PathBuf,
}

impl FileLogStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_raw(&self) -> Result<Option<Value>, StoreError> {
        if !fs::try_exists(&self.path).await? {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path).await?;
        if json.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&json)?))
    }
}

#[async_trait]
impl LogStore for FileLogStore {
    async fn get_all(&self) -> Result<Snapshot, StoreError> {
        match self.read_raw().await? {
            Some(value) => decode_snapshot(value),
            None => {
                log::debug!("Scan log {} is empty", self.path.display());
                Ok(Snapshot::new())
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let Some(mut value) = self.read_raw().await? else {
            return Ok(());
        };

        let removed = match &mut value {
            Value::Object(records) => records.remove(key).is_some(),
            // Array logs are keyed by index; clear the slot so later keys keep their place
            Value::Array(records) => match key
                .parse::<usize>()
                .ok()
                .and_then(|index| records.get_mut(index))
            {
                Some(slot) if !slot.is_null() => {
                    *slot = Value::Null;
                    true
                }
                _ => false,
            },
            Value::Null => false,
            _ => return Err(StoreError::UnexpectedShape("a non-collection file".to_string())),
        };

        if removed {
            let json = serde_json::to_string_pretty(&value)?;
            fs::write(&self.path, json).await?;
            log::debug!("Deleted scan record {} from {}", key, self.path.display());
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

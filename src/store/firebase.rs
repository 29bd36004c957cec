//! Firebase Realtime Database backend
//!
//! Talks to the database REST interface:
//!
//! - `GET {database_url}/{path}.json` returns the whole collection (`null` when empty)
//! - `DELETE {database_url}/{path}/{key}.json` removes one record (absent keys succeed)
//!
//! A database secret or ID token, when configured, is sent as the `auth`
//! query parameter.

use {
    super::{decode_snapshot, validate_key, LogStore, Snapshot, StoreError},
    crate::config::FirebaseConfig,
    async_trait::async_trait,
    reqwest::{Client, Method, RequestBuilder, Response},
    serde_json::Value,
};

pub struct FirebaseLogStore {
    client: Client,
    database_url: String,
    logs_path: String,
    auth_token: Option<String>,
}

impl FirebaseLogStore {
    pub fn new(config: &FirebaseConfig) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            database_url: config.database_url.trim_end_matches('/').to_string(),
            logs_path: config.logs_path.trim_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/{}.json", self.database_url, self.logs_path)
    }

    fn record_url(&self, key: &str) -> String {
        format!("{}/{}/{}.json", self.database_url, self.logs_path, key)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.auth_token {
            Some(token) => request.query(&[("auth", token)]),
            None => request,
        }
    }

    async fn check_status(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl LogStore for FirebaseLogStore {
    async fn get_all(&self) -> Result<Snapshot, StoreError> {
        let response = self
            .request(Method::GET, &self.collection_url())
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let value: Value = response.json().await?;
        let snapshot = decode_snapshot(value)?;

        log::debug!("Fetched {} scan records from {}", snapshot.len(), self.describe());
        Ok(snapshot)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;

        let response = self
            .request(Method::DELETE, &self.record_url(key))
            .send()
            .await?;
        Self::check_status(response).await?;

        log::debug!("Deleted scan record {} from {}", key, self.describe());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("firebase {}/{}", self.database_url, self.logs_path)
    }
}

//! REST client for a remote message store and profile directory.

use recomendify_core::realtime::LiveChannel;
use recomendify_core::repository::{MessageStore, ProfileDirectory};
use recomendify_types::error::StoreError;
use recomendify_types::message::{NewMessage, PrivateMessage};
use recomendify_types::peer::Profile;
use recomendify_types::routes::{MESSAGES_PATH, PROFILES_PATH, REALTIME_MESSAGES_PATH, join_url};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::realtime;

/// `MessageStore` and `ProfileDirectory` backed by a Recomendify server.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteStore {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Flag a message as read.
    pub async fn mark_read(&self, id: &str) -> Result<PrivateMessage, StoreError> {
        let url = format!("{}/{id}/read", self.url(MESSAGES_PATH));
        let response = self.client.post(url).send().await.map_err(transport_error)?;
        decode(response).await
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

impl MessageStore for RemoteStore {
    async fn fetch_conversation(
        &self,
        user_id: &str,
        peer_id: &str,
    ) -> Result<Vec<PrivateMessage>, StoreError> {
        let response = self
            .client
            .get(self.url(MESSAGES_PATH))
            .query(&[("user_id", user_id), ("peer_id", peer_id)])
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }

    async fn insert_message(&self, message: &NewMessage) -> Result<PrivateMessage, StoreError> {
        let response = self
            .client
            .post(self.url(MESSAGES_PATH))
            .json(message)
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }

    async fn subscribe(&self, channel: &str) -> Result<LiveChannel, StoreError> {
        realtime::open_channel(&self.client, &self.url(REALTIME_MESSAGES_PATH), channel).await
    }
}

impl ProfileDirectory for RemoteStore {
    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        let response = self
            .client
            .get(self.url(PROFILES_PATH))
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }

    async fn get_profile(&self, id: &str) -> Result<Option<Profile>, StoreError> {
        let url = format!("{}/{id}", self.url(PROFILES_PATH));
        let response = self.client.get(url).send().await.map_err(transport_error)?;
        match decode(response).await {
            Ok(profile) => Ok(Some(profile)),
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, StoreError> {
        let response = self
            .client
            .get(self.url(PROFILES_PATH))
            .query(&[("email", email)])
            .send()
            .await
            .map_err(transport_error)?;
        let profiles: Vec<Profile> = decode(response).await?;
        Ok(profiles.into_iter().next())
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<Profile, StoreError> {
        let response = self
            .client
            .post(self.url(PROFILES_PATH))
            .json(profile)
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }
}

fn transport_error(e: reqwest::Error) -> StoreError {
    if e.is_connect() || e.is_timeout() {
        StoreError::Connection(e.to_string())
    } else {
        StoreError::Query(e.to_string())
    }
}

/// Map the status to a `StoreError` or parse the JSON body.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, StoreError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json()
            .await
            .map_err(|e| StoreError::Query(format!("invalid response body: {e}")));
    }

    let body = response.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::NOT_FOUND => StoreError::NotFound,
        StatusCode::CONFLICT => StoreError::Conflict(body),
        _ => StoreError::Query(format!("HTTP {}: {body}", status.as_u16())),
    })
}

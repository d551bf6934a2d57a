//! REST client for the hosted progress store.
//!
//! Table endpoints take PostgREST-style filters (`?user_id=eq.<id>`) and a
//! bearer token. Without an authenticated user every call is a successful
//! no-op: the app keeps working on local state only.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use super::{Category, ProgressPatch, ProgressStore, StudySession};
use crate::error::StoreError;
use crate::ledger::ProgressCounters;

const PROGRESS_TABLE: &str = "progress";
const SESSIONS_TABLE: &str = "study_sessions";
const CATEGORIES_TABLE: &str = "categories";

/// Authenticated user identity for store requests.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub token: String,
}

/// One progress-counters row as stored remotely.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProgressRow {
    user_id: String,
    #[serde(flatten)]
    counters: ProgressCounters,
}

#[derive(Debug, Serialize)]
struct SessionRow<'a> {
    user_id: &'a str,
    #[serde(flatten)]
    session: &'a StudySession,
}

#[derive(Debug, Serialize)]
struct CategoryRow<'a> {
    user_id: &'a str,
    #[serde(flatten)]
    category: &'a Category,
}

/// `reqwest`-backed progress store.
pub struct RestProgressStore {
    http: Client,
    base: Url,
    auth: Option<AuthContext>,
}

impl RestProgressStore {
    /// `base_url` is the service's table-endpoint root. `auth` is `None`
    /// for a signed-out user.
    pub fn new(base_url: &str, auth: Option<AuthContext>) -> Result<Self, StoreError> {
        // Url::join drops the last path segment unless the base ends in '/'.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        Ok(Self {
            http: Client::new(),
            base: Url::parse(&normalized)?,
            auth,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    fn table(&self, name: &str) -> Result<Url, StoreError> {
        Ok(self.base.join(name)?)
    }

    async fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(StoreError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ProgressStore for RestProgressStore {
    async fn get_progress(&self) -> Result<Option<ProgressCounters>, StoreError> {
        let Some(auth) = &self.auth else {
            return Ok(None);
        };
        let mut url = self.table(PROGRESS_TABLE)?;
        url.query_pairs_mut()
            .append_pair("user_id", &format!("eq.{}", auth.user_id))
            .append_pair("limit", "1");
        let response = self
            .http
            .get(url)
            .bearer_auth(&auth.token)
            .send()
            .await?;
        let rows: Vec<ProgressRow> = Self::check(response).await?.json().await?;
        if let Some(row) = rows.into_iter().next() {
            return Ok(Some(row.counters));
        }

        // First contact: create the row with the starter gift.
        let starter = ProgressCounters::starter(Utc::now().date_naive());
        let row = ProgressRow {
            user_id: auth.user_id.clone(),
            counters: starter.clone(),
        };
        let response = self
            .http
            .post(self.table(PROGRESS_TABLE)?)
            .bearer_auth(&auth.token)
            .json(&row)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(Some(starter))
    }

    async fn update_progress(&self, patch: &ProgressPatch) -> Result<bool, StoreError> {
        let Some(auth) = &self.auth else {
            return Ok(false);
        };
        let mut url = self.table(PROGRESS_TABLE)?;
        url.query_pairs_mut()
            .append_pair("user_id", &format!("eq.{}", auth.user_id));
        let response = self
            .http
            .patch(url)
            .bearer_auth(&auth.token)
            .json(patch)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(true)
    }

    async fn insert_session(&self, session: &StudySession) -> Result<bool, StoreError> {
        let Some(auth) = &self.auth else {
            return Ok(false);
        };
        let row = SessionRow {
            user_id: &auth.user_id,
            session,
        };
        let response = self
            .http
            .post(self.table(SESSIONS_TABLE)?)
            .bearer_auth(&auth.token)
            .json(&row)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(true)
    }

    async fn list_sessions(&self, since_days: u32) -> Result<Vec<StudySession>, StoreError> {
        let Some(auth) = &self.auth else {
            return Ok(Vec::new());
        };
        let cutoff = Utc::now() - Duration::days(since_days as i64);
        let mut url = self.table(SESSIONS_TABLE)?;
        url.query_pairs_mut()
            .append_pair("user_id", &format!("eq.{}", auth.user_id))
            .append_pair("started_at", &format!("gte.{}", cutoff.to_rfc3339()))
            .append_pair("order", "started_at.desc");
        let response = self
            .http
            .get(url)
            .bearer_auth(&auth.token)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let Some(auth) = &self.auth else {
            return Ok(Vec::new());
        };
        let mut url = self.table(CATEGORIES_TABLE)?;
        url.query_pairs_mut()
            .append_pair("user_id", &format!("eq.{}", auth.user_id))
            .append_pair("order", "name.asc");
        let response = self
            .http
            .get(url)
            .bearer_auth(&auth.token)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn insert_category(&self, category: &Category) -> Result<bool, StoreError> {
        let Some(auth) = &self.auth else {
            return Ok(false);
        };
        let row = CategoryRow {
            user_id: &auth.user_id,
            category,
        };
        let response = self
            .http
            .post(self.table(CATEGORIES_TABLE)?)
            .bearer_auth(&auth.token)
            .json(&row)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(true)
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, StoreError> {
        let Some(auth) = &self.auth else {
            return Ok(false);
        };
        let mut url = self.table(CATEGORIES_TABLE)?;
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{id}"));
        let response = self
            .http
            .delete(url)
            .bearer_auth(&auth.token)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(true)
    }
}

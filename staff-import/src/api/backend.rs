//! Backend contract consumed by the importer

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Query;

/// An authentication account
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Profile attributes stored on a new account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserMetadata {
    pub full_name: String,
}

/// Payload for creating an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
    pub email: String,
    /// Mark the email as confirmed so no confirmation mail is sent
    pub email_confirm: bool,
    pub user_metadata: UserMetadata,
}

impl NewUser {
    /// A confirmed account carrying the staff member's display name
    pub fn confirmed(email: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            email_confirm: true,
            user_metadata: UserMetadata {
                full_name: full_name.into(),
            },
        }
    }
}

/// An object to put into a storage bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageObject {
    pub bucket: String,
    /// Path inside the bucket
    pub path: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    /// Overwrite an existing object at the same path
    pub upsert: bool,
}

/// Public URL of an object in a public bucket
pub fn public_object_url(endpoint: &str, bucket: &str, path: &str) -> String {
    format!(
        "{}/storage/v1/object/public/{}/{}",
        endpoint.trim_end_matches('/'),
        bucket,
        path
    )
}

/// Operations the importer needs from the hosted backend.
///
/// Calls are never retried by implementations; any retry policy lives in the
/// caller.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Look up an account by email address
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>>;

    /// Create an account
    async fn create_user(&self, user: &NewUser) -> Result<AuthUser>;

    /// Fetch the rows matching a query
    async fn select(&self, query: &Query) -> Result<Vec<Value>>;

    /// Apply `patch` to the rows matching the query's filters
    async fn update(&self, query: &Query, patch: &Value) -> Result<()>;

    /// Insert `record`, replacing the existing row that conflicts on `on_conflict`
    async fn upsert(&self, table: &str, record: &Value, on_conflict: &str) -> Result<()>;

    /// Store an object and return its public URL
    async fn upload(&self, object: &StorageObject) -> Result<String>;
}

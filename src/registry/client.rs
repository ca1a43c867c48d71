//! Application registry boundary.
//!
//! The registry is an external collaborator (managed database + object
//! storage); the core flows consume this trait and never see the wire. The
//! Supabase-backed implementation lives in [`crate::registry::supabase`].

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::application::{Application, NewApplication};

/// Bundle file carried alongside a metadata insert.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("application {0} not found")]
    NotFound(i64),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rejected with status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("malformed response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait ApplicationRegistry: Send + Sync {
    async fn list_applications(&self, owner_wallet: &str) -> Result<Vec<Application>, RegistryError>;

    async fn get_application(&self, id: i64) -> Result<Application, RegistryError>;

    /// Uploads the bundle under a fresh storage key, then inserts the row.
    /// When the insert fails the uploaded object is deleted again so no
    /// orphan stays behind.
    async fn create_application(
        &self,
        metadata: NewApplication,
        file: &UploadFile,
    ) -> Result<Application, RegistryError>;

    /// Signed, expiring download URL for a stored bundle.
    async fn download_url(
        &self,
        storage_key: &str,
        expires_in_secs: u64,
    ) -> Result<String, RegistryError>;

    /// Adds `amount` to the application's emitted-license counter and returns
    /// the updated row.
    async fn increment_license_count(
        &self,
        id: i64,
        amount: i64,
    ) -> Result<Application, RegistryError>;

    /// Cheap reachability probe for health checks.
    async fn health(&self) -> Result<(), RegistryError>;
}

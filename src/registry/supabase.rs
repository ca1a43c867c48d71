//! Supabase-backed registry client.
//!
//! Rows live in PostgREST (`/rest/v1/application`), bundles in the storage
//! API (`/storage/v1/object/...`). Uploaded objects are keyed by
//! `{owner_wallet}/{timestamp}-{suffix}.{ext}` and that key doubles as the
//! row's `application_id`.

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use reqwest::{RequestBuilder, Response};
use serde_json::{json, Value as JsonValue};

use crate::domain::application::{Application, NewApplication};
use crate::infra::config;
use crate::registry::client::{ApplicationRegistry, RegistryError, UploadFile};

const APPLICATIONS_TABLE: &str = "application";
/// Matches the width of a `Math.random().toString(36)` style suffix.
const STORAGE_SUFFIX_LEN: usize = 11;

pub struct SupabaseRegistry {
    base_url: String,
    access_token: String,
    bucket: String,
    http: reqwest::Client,
}

impl SupabaseRegistry {
    pub fn new(base_url: String, access_token: String, bucket: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
            bucket,
            http: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            config::supabase_url(),
            config::supabase_access_token(),
            config::supabase_bucket_name(),
        )
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, APPLICATIONS_TABLE)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.access_token)
            .bearer_auth(&self.access_token)
    }

    async fn fetch_single(&self, id: i64) -> Result<Response, RegistryError> {
        let id_filter = format!("eq.{}", id);
        let resp = self
            .authed(self.http.get(self.table_url()))
            .query(&[("select", "*"), ("id", id_filter.as_str())])
            .header("Accept", "application/vnd.pgrst.object+json")
            .send()
            .await?;
        match expect_success(resp).await {
            Ok(resp) => Ok(resp),
            // PostgREST answers 406 when the single-object request matches
            // no row.
            Err(RegistryError::Api { status: 404 | 406, .. }) => Err(RegistryError::NotFound(id)),
            Err(e) => Err(e),
        }
    }

    async fn upload_object(&self, storage_key: &str, bytes: &[u8]) -> Result<(), RegistryError> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, storage_key);
        let resp = self
            .authed(self.http.post(url))
            .header("Content-Type", "application/octet-stream")
            .body(bytes.to_vec())
            .send()
            .await?;
        expect_success(resp).await?;
        Ok(())
    }

    async fn remove_object(&self, storage_key: &str) -> Result<(), RegistryError> {
        let url = format!("{}/storage/v1/object/{}", self.base_url, self.bucket);
        let resp = self
            .authed(self.http.delete(url))
            .json(&json!({ "prefixes": [storage_key] }))
            .send()
            .await?;
        expect_success(resp).await?;
        Ok(())
    }
}

#[async_trait]
impl ApplicationRegistry for SupabaseRegistry {
    async fn list_applications(&self, owner_wallet: &str) -> Result<Vec<Application>, RegistryError> {
        let owner_filter = format!("eq.{}", owner_wallet);
        let resp = self
            .authed(self.http.get(self.table_url()))
            .query(&[("select", "*"), ("owner_wallet", owner_filter.as_str())])
            .send()
            .await?;
        let resp = expect_success(resp).await?;
        Ok(resp.json::<Vec<Application>>().await?)
    }

    async fn get_application(&self, id: i64) -> Result<Application, RegistryError> {
        let resp = self.fetch_single(id).await?;
        Ok(resp.json::<Application>().await?)
    }

    async fn create_application(
        &self,
        metadata: NewApplication,
        file: &UploadFile,
    ) -> Result<Application, RegistryError> {
        let ext = file.file_name.rsplit('.').next().unwrap_or_default();
        let object_name = format!(
            "{}-{}.{}",
            Utc::now().timestamp_millis(),
            random_suffix(STORAGE_SUFFIX_LEN),
            ext
        );
        let storage_key = format!("{}/{}", metadata.owner_wallet, object_name);

        self.upload_object(&storage_key, &file.bytes).await?;

        let mut row = serde_json::to_value(&metadata)
            .map_err(|e| RegistryError::InvalidResponse(format!("unserializable metadata: {}", e)))?;
        row["application_id"] = JsonValue::from(storage_key.clone());
        row["app_size"] = JsonValue::from(file.bytes.len() as i64);

        let resp = self
            .authed(self.http.post(self.table_url()))
            .header("Accept", "application/vnd.pgrst.object+json")
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        match expect_success(resp).await {
            Ok(resp) => Ok(resp.json::<Application>().await?),
            Err(e) => {
                // A failed insert must not leave an orphaned object behind.
                if let Err(cleanup) = self.remove_object(&storage_key).await {
                    eprintln!(
                        "> Registry: could not delete orphaned object {}: {}",
                        storage_key, cleanup
                    );
                }
                Err(e)
            }
        }
    }

    async fn download_url(
        &self,
        storage_key: &str,
        expires_in_secs: u64,
    ) -> Result<String, RegistryError> {
        let url = format!(
            "{}/storage/v1/object/sign/{}/{}",
            self.base_url, self.bucket, storage_key
        );
        let resp = self
            .authed(self.http.post(url))
            .json(&json!({ "expiresIn": expires_in_secs }))
            .send()
            .await?;
        let resp = expect_success(resp).await?;
        let body: JsonValue = resp.json().await?;
        let signed_path = body
            .get("signedURL")
            .or_else(|| body.get("signedUrl"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                RegistryError::InvalidResponse("sign response carries no signedURL".to_string())
            })?;
        Ok(format!("{}/storage/v1{}", self.base_url, signed_path))
    }

    async fn increment_license_count(
        &self,
        id: i64,
        amount: i64,
    ) -> Result<Application, RegistryError> {
        let current = self.get_application(id).await?;
        let new_amount = current.licences_emited + amount;

        let id_filter = format!("eq.{}", id);
        let resp = self
            .authed(self.http.patch(self.table_url()))
            .query(&[("id", id_filter.as_str())])
            .header("Accept", "application/vnd.pgrst.object+json")
            .header("Prefer", "return=representation")
            .json(&json!({ "licences_emited": new_amount }))
            .send()
            .await?;
        let resp = expect_success(resp).await?;
        Ok(resp.json::<Application>().await?)
    }

    async fn health(&self) -> Result<(), RegistryError> {
        let resp = self
            .authed(self.http.get(self.table_url()))
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await?;
        expect_success(resp).await?;
        Ok(())
    }
}

async fn expect_success(resp: Response) -> Result<Response, RegistryError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(RegistryError::Api {
        status: status.as_u16(),
        body,
    })
}

fn random_suffix(len: usize) -> String {
    const CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| CHARS[rng.gen_range(0..CHARS.len())] as char)
        .collect()
}

// Object storage client for an S3-compatible store.
// Drives the raw REST API through reqwest with SigV4 query presigning; media
// responses never expose raw object keys, only short-lived presigned URLs.

use chrono::{DateTime, Utc};
use reqwest::Client;
use ring::hmac;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{error, instrument};

use crate::app_config::StorageConfig;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage configuration missing: {0}")]
    MissingConfig(&'static str),

    #[error("Storage request failed: {0}")]
    Request(String),

    #[error("Storage request returned status {0}: {1}")]
    UnexpectedStatus(u16, String),
}

#[derive(Clone)]
pub struct StorageService {
    client: Client,
    config: StorageConfig,
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let key = hmac::Key::new(hmac::HMAC_SHA256, key);
    hmac::sign(&key, data).as_ref().to_vec()
}

/// Percent-encode a single path segment per SigV4 rules
fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

impl StorageService {
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        if config.bucket.is_empty() {
            return Err(StorageError::MissingConfig("S3_BUCKET"));
        }
        if config.access_key.is_empty() {
            return Err(StorageError::MissingConfig("S3_ACCESS_KEY"));
        }
        if config.secret_key.is_empty() {
            return Err(StorageError::MissingConfig("S3_SECRET_KEY"));
        }

        Ok(Self {
            client: Client::new(),
            config,
        })
    }

    fn host(&self) -> String {
        url::Url::parse(&self.config.endpoint)
            .ok()
            .and_then(|u| {
                u.host_str().map(|h| match u.port() {
                    Some(port) => format!("{}:{}", h, port),
                    None => h.to_string(),
                })
            })
            .unwrap_or_else(|| self.config.endpoint.clone())
    }

    /// Path-style canonical URI: /{bucket}/{key}
    fn canonical_uri(&self, object_key: &str) -> String {
        let encoded_key: Vec<String> = object_key.split('/').map(encode_segment).collect();
        format!(
            "/{}/{}",
            encode_segment(&self.config.bucket),
            encoded_key.join("/")
        )
    }

    /// Build a SigV4 presigned URL for the given method and object key
    pub fn presign(
        &self,
        method: &str,
        object_key: &str,
        expires_seconds: u64,
        now: DateTime<Utc>,
    ) -> String {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let datestamp = now.format("%Y%m%d").to_string();
        let scope = format!("{}/{}/s3/aws4_request", datestamp, self.config.region);
        let credential = format!("{}/{}", self.config.access_key, scope);
        let host = self.host();
        let canonical_uri = self.canonical_uri(object_key);

        // Query parameters in sorted order
        let canonical_query = format!(
            "X-Amz-Algorithm=AWS4-HMAC-SHA256&X-Amz-Credential={}&X-Amz-Date={}&X-Amz-Expires={}&X-Amz-SignedHeaders=host",
            urlencoding::encode(&credential),
            amz_date,
            expires_seconds,
        );

        let canonical_request = format!(
            "{}\n{}\n{}\nhost:{}\n\nhost\nUNSIGNED-PAYLOAD",
            method, canonical_uri, canonical_query, host,
        );

        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{}\n{}\n{}",
            amz_date,
            scope,
            sha256_hex(canonical_request.as_bytes()),
        );

        let date_key = hmac_sha256(
            format!("AWS4{}", self.config.secret_key).as_bytes(),
            datestamp.as_bytes(),
        );
        let region_key = hmac_sha256(&date_key, self.config.region.as_bytes());
        let service_key = hmac_sha256(&region_key, b"s3");
        let signing_key = hmac_sha256(&service_key, b"aws4_request");
        let signature = hex(&hmac_sha256(&signing_key, string_to_sign.as_bytes()));

        format!(
            "{}{}?{}&X-Amz-Signature={}",
            self.config.endpoint.trim_end_matches('/'),
            canonical_uri,
            canonical_query,
            signature,
        )
    }

    /// Temporary GET URL handed out in API responses
    pub fn presigned_get_url(&self, object_key: &str) -> String {
        self.presign("GET", object_key, self.config.presigned_url_expiry, Utc::now())
    }

    /// Upload an object from memory
    #[instrument(skip(self, body), fields(key = %object_key, bytes = body.len()))]
    pub async fn put_object(
        &self,
        object_key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let url = self.presign("PUT", object_key, 300, Utc::now());

        let response = self
            .client
            .put(&url)
            .header("Content-Type", content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            error!("Object upload failed with status {}: {}", status, text);
            return Err(StorageError::UnexpectedStatus(status, text));
        }

        Ok(())
    }

    /// Delete an object by key
    #[instrument(skip(self), fields(key = %object_key))]
    pub async fn delete_object(&self, object_key: &str) -> Result<(), StorageError> {
        let url = self.presign("DELETE", object_key, 300, Utc::now());

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        // 404 on delete is treated as success: the object is gone either way
        if !response.status().is_success() && response.status().as_u16() != 404 {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            error!("Object delete failed with status {}: {}", status, text);
            return Err(StorageError::UnexpectedStatus(status, text));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_config() -> StorageConfig {
        StorageConfig {
            endpoint: "http://localhost:9000".to_string(),
            region: "us-east-1".to_string(),
            bucket: "moments-media".to_string(),
            access_key: "minio-access".to_string(),
            secret_key: "minio-secret".to_string(),
            presigned_url_expiry: 3600,
        }
    }

    #[test]
    fn test_new_requires_credentials() {
        let mut config = test_config();
        config.bucket = String::new();
        assert!(matches!(
            StorageService::new(config),
            Err(StorageError::MissingConfig("S3_BUCKET"))
        ));

        let mut config = test_config();
        config.secret_key = String::new();
        assert!(matches!(
            StorageService::new(config),
            Err(StorageError::MissingConfig("S3_SECRET_KEY"))
        ));
    }

    #[test]
    fn test_presigned_url_shape() {
        let service = StorageService::new(test_config()).expect("service");
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 10, 30, 0).unwrap();

        let url = service.presign("GET", "posts/u1/p1/post_0.jpg", 3600, now);

        assert!(url.starts_with("http://localhost:9000/moments-media/posts/u1/p1/post_0.jpg?"));
        assert!(url.contains("X-Amz-Algorithm=AWS4-HMAC-SHA256"));
        assert!(url.contains("X-Amz-Credential=minio-access%2F20250615%2Fus-east-1%2Fs3%2Faws4_request"));
        assert!(url.contains("X-Amz-Date=20250615T103000Z"));
        assert!(url.contains("X-Amz-Expires=3600"));
        assert!(url.contains("X-Amz-SignedHeaders=host"));

        let signature = url
            .rsplit("X-Amz-Signature=")
            .next()
            .expect("signature param");
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_presign_is_deterministic_for_fixed_time() {
        let service = StorageService::new(test_config()).expect("service");
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 10, 30, 0).unwrap();

        let first = service.presign("GET", "posts/a/b/post_0.png", 600, now);
        let second = service.presign("GET", "posts/a/b/post_0.png", 600, now);
        assert_eq!(first, second);

        // Different method must change the signature
        let put = service.presign("PUT", "posts/a/b/post_0.png", 600, now);
        assert_ne!(first, put);
    }
}

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::{BlobError, BlobStore, BlobUpload, StoredBlob};
use crate::config::BlobConfig;

/// Cloudinary files audio under the "video" resource type
const RESOURCE_TYPE: &str = "video";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

/// Signed-upload client for a Cloudinary-compatible API
pub struct CloudinaryStore {
    client: reqwest::Client,
    config: BlobConfig,
}

impl CloudinaryStore {
    pub fn new(config: BlobConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.ensure_configured().is_ok()
    }

    fn ensure_configured(&self) -> Result<(), BlobError> {
        if self.config.cloud_name.is_empty() {
            return Err(BlobError::NotConfigured("CLOUDINARY_CLOUD_NAME"));
        }
        if self.config.api_key.is_empty() {
            return Err(BlobError::NotConfigured("CLOUDINARY_API_KEY"));
        }
        if self.config.api_secret.is_empty() {
            return Err(BlobError::NotConfigured("CLOUDINARY_API_SECRET"));
        }
        Ok(())
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.cloud_name,
            RESOURCE_TYPE,
            action
        )
    }

    /// Request signature: params sorted by name, joined as `k=v&k=v`, secret
    /// appended, SHA-256 hex digest.
    fn sign(params: &[(&str, &str)], secret: &str) -> String {
        let mut sorted: Vec<_> = params.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let payload = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(payload.as_bytes());
        hasher.update(secret.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    async fn rejection(response: reqwest::Response) -> BlobError {
        let status = response.status().as_u16();
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error.message,
            Err(_) => "no error message".to_string(),
        };
        BlobError::Rejected { status, message }
    }
}

#[async_trait]
impl BlobStore for CloudinaryStore {
    async fn upload(&self, upload: BlobUpload) -> Result<StoredBlob, BlobError> {
        self.ensure_configured()?;

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = Self::sign(
            &[("folder", self.config.folder.as_str()), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let mut part = Part::bytes(upload.bytes)
            .file_name(upload.filename.unwrap_or_else(|| "complaint".to_string()));
        if let Some(content_type) = upload.content_type.as_deref() {
            part = part.mime_str(content_type)?;
        }

        let form = Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("folder", self.config.folder.clone())
            .text("timestamp", timestamp)
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let response = self.client.post(self.endpoint("upload")).multipart(form).send().await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| BlobError::UnexpectedResponse(e.to_string()))?;

        debug!(public_id = %body.public_id, "Uploaded voice complaint");
        Ok(StoredBlob {
            url: body.secure_url,
            blob_ref: body.public_id,
        })
    }

    async fn delete(&self, blob_ref: &str) -> Result<(), BlobError> {
        self.ensure_configured()?;

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = Self::sign(
            &[("public_id", blob_ref), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let params = [
            ("public_id", blob_ref),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.config.api_key.as_str()),
            ("signature_algorithm", "sha256"),
            ("signature", signature.as_str()),
        ];

        let response = self.client.post(self.endpoint("destroy")).form(&params).send().await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|e| BlobError::UnexpectedResponse(e.to_string()))?;

        match body.result.as_str() {
            "ok" => Ok(()),
            "not found" => {
                warn!(blob_ref, "Blob already absent from store");
                Ok(())
            }
            other => Err(BlobError::UnexpectedResponse(format!("destroy result '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> BlobConfig {
        BlobConfig {
            cloud_name: "demo".to_string(),
            api_key: "123".to_string(),
            api_secret: "abcd".to_string(),
            ..BlobConfig::default()
        }
    }

    #[test]
    fn signs_sorted_params_with_secret() {
        let signature = CloudinaryStore::sign(
            &[("timestamp", "1700000000"), ("folder", "complaints")],
            "abcd",
        );
        assert_eq!(
            signature,
            "3ef775ab22afa58d084131f4ba87851b1ef75648ee4db5109adab2e63be3273b"
        );

        let destroy = CloudinaryStore::sign(
            &[("public_id", "complaints/voice_1"), ("timestamp", "1700000000")],
            "abcd",
        );
        assert_eq!(
            destroy,
            "5dbe514d98bdea672e907688b944f8000a7155bdcdf034b8f478e0a95b0de4de"
        );
    }

    #[test]
    fn builds_resource_endpoints() {
        let store = CloudinaryStore::new(configured());
        assert_eq!(
            store.endpoint("upload"),
            "https://api.cloudinary.com/v1_1/demo/video/upload"
        );
        assert_eq!(
            store.endpoint("destroy"),
            "https://api.cloudinary.com/v1_1/demo/video/destroy"
        );
    }

    #[tokio::test]
    async fn unconfigured_store_fails_before_network() {
        let store = CloudinaryStore::new(BlobConfig::default());
        assert!(!store.is_configured());

        let err = store
            .upload(BlobUpload {
                bytes: vec![1, 2, 3],
                filename: None,
                content_type: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BlobError::NotConfigured("CLOUDINARY_CLOUD_NAME")));

        let err = store.delete("complaints/x").await.unwrap_err();
        assert!(matches!(err, BlobError::NotConfigured(_)));
    }
}

use std::env;

use log::warn;
use reqwest::header::CONTENT_TYPE;

use crate::utils::error::CustomError;

/// Object storage over plain HTTP PUTs plus a fire-and-forget CDN
/// invalidation hook. Endpoints come from the environment.
pub struct StorageService {
    client: reqwest::Client,
    endpoint: String,
    bucket: String,
    public_url: String,
    cdn_invalidation_url: Option<String>,
}

impl StorageService {
    pub fn from_env() -> Result<Self, CustomError> {
        let endpoint = env::var("STORAGE_ENDPOINT")
            .map_err(|_| CustomError::InternalServerError("STORAGE_ENDPOINT is required".to_string()))?;
        let bucket = env::var("STORAGE_BUCKET")
            .map_err(|_| CustomError::InternalServerError("STORAGE_BUCKET is required".to_string()))?;
        let public_url = env::var("STORAGE_PUBLIC_URL")
            .unwrap_or_else(|_| format!("{}/{}", endpoint.trim_end_matches('/'), bucket));

        Ok(StorageService {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket,
            public_url: public_url.trim_end_matches('/').to_string(),
            cdn_invalidation_url: env::var("CDN_INVALIDATION_URL").ok(),
        })
    }

    fn content_type_for(file_name: &str) -> &'static str {
        match file_name.rsplit('.').next() {
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("png") => "image/png",
            _ => "binary/octet-stream",
        }
    }

    /// Uploads `bytes` under `<path>/<file_name>` and returns the public URL.
    pub async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        path: &str,
    ) -> Result<String, CustomError> {
        let url = format!("{}/{}/{}/{}", self.endpoint, self.bucket, path, file_name);

        let response = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, Self::content_type_for(file_name))
            .body(bytes)
            .send()
            .await
            .map_err(|e| CustomError::BadRequestError(format!("Upload failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(CustomError::BadRequestError("Upload failed".to_string()));
        }

        Ok(format!("{}/{}/{}", self.public_url, path, file_name))
    }

    /// Asks the CDN to drop its cached pages. Failures are logged and
    /// swallowed; a stale cache is not worth failing a publish over.
    pub async fn invalidate_cdn(&self) {
        let Some(url) = &self.cdn_invalidation_url else {
            return;
        };

        let result = self
            .client
            .post(url)
            .json(&serde_json::json!({ "paths": ["/rss", "/*", "/static/*", "/rss*"] }))
            .send()
            .await;

        match result {
            Ok(response) if !response.status().is_success() => {
                warn!("CDN invalidation returned {}", response.status());
            }
            Err(e) => warn!("CDN invalidation failed: {}", e),
            Ok(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_content_type_from_extension() {
        assert_eq!(StorageService::content_type_for("a.jpg"), "image/jpeg");
        assert_eq!(StorageService::content_type_for("a.jpeg"), "image/jpeg");
        assert_eq!(StorageService::content_type_for("a.png"), "image/png");
        assert_eq!(StorageService::content_type_for("a.bin"), "binary/octet-stream");
        assert_eq!(StorageService::content_type_for("no-extension"), "binary/octet-stream");
    }
}

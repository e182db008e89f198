use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use futures_util::StreamExt;
use imagegen_core::{default_remote_filename, download_filename, ImageSource};
use imagegen_logging::imagegen_info;
use reqwest::header::CONTENT_TYPE;

use crate::persist::AtomicFileWriter;
use crate::SaveError;

#[derive(Debug, Clone)]
pub struct SaveSettings {
    pub output_dir: PathBuf,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl SaveSettings {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            max_bytes: 20 * 1024 * 1024,
        }
    }
}

/// Writes the displayed image to disk: inline data is decoded, remote URLs are
/// downloaded with a size cap.
#[derive(Debug, Clone)]
pub struct ImageSaver {
    settings: SaveSettings,
}

impl ImageSaver {
    pub fn new(settings: SaveSettings) -> Self {
        Self { settings }
    }

    pub fn output_dir(&self) -> &Path {
        &self.settings.output_dir
    }

    pub async fn save(
        &self,
        source: &ImageSource,
        timestamp_millis: i64,
    ) -> Result<PathBuf, SaveError> {
        let (filename, bytes) = match source {
            ImageSource::InlineData { base64, .. } => {
                let bytes = decode_inline(base64)?;
                let filename = download_filename(source, timestamp_millis)
                    .unwrap_or_else(|| format!("ai-image-{timestamp_millis}.png"));
                (filename, bytes)
            }
            ImageSource::RemoteUrl(url) => {
                let bytes = self.download(url).await?;
                (default_remote_filename(url, timestamp_millis), bytes)
            }
        };

        let writer = AtomicFileWriter::new(self.settings.output_dir.clone());
        let path = writer
            .write_new(&filename, &bytes)
            .map_err(|err| SaveError::Write(err.to_string()))?;
        imagegen_info!("saved image to {:?} ({} bytes)", path, bytes.len());
        Ok(path)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, SaveError> {
        let client = reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| SaveError::Download(err.to_string()))?;

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|err| SaveError::Download(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SaveError::HttpStatus(status.as_u16()));
        }

        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(SaveError::TooLarge {
                    max_bytes,
                    actual: Some(content_len),
                });
            }
        }

        if let Some(ct) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
        {
            if !is_image_content_type(ct) {
                return Err(SaveError::UnsupportedContentType(ct.to_string()));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| SaveError::Download(err.to_string()))?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(SaveError::TooLarge {
                    max_bytes,
                    actual: Some(next_len),
                });
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

fn decode_inline(data: &str) -> Result<Vec<u8>, SaveError> {
    // Some providers hand back a full data URI instead of bare base64.
    let payload = match data.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data,
    };
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    BASE64
        .decode(compact.as_bytes())
        .map_err(|err| SaveError::InvalidBase64(err.to_string()))
}

fn is_image_content_type(content_type: &str) -> bool {
    let ct = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase();
    ct.starts_with("image/") || ct == "application/octet-stream"
}

#[cfg(test)]
mod tests {
    use super::{decode_inline, is_image_content_type};

    #[test]
    fn decodes_bare_and_data_uri_payloads() {
        assert_eq!(decode_inline("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(
            decode_inline("data:image/png;base64,aGVs\nbG8=").unwrap(),
            b"hello"
        );
        assert!(decode_inline("not base64!").is_err());
    }

    #[test]
    fn accepts_image_content_types() {
        assert!(is_image_content_type("image/png"));
        assert!(is_image_content_type("IMAGE/WEBP; q=1"));
        assert!(is_image_content_type("application/octet-stream"));
        assert!(!is_image_content_type("text/html; charset=utf-8"));
    }
}

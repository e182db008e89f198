use url::Url;

/// Mime type assumed for inline image data; every known dialect returns PNG.
pub const DEFAULT_MIME_TYPE: &str = "image/png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    RemoteUrl(String),
    InlineData { base64: String, mime_type: String },
}

impl ImageSource {
    pub fn inline_png(base64: impl Into<String>) -> Self {
        ImageSource::InlineData {
            base64: base64.into(),
            mime_type: DEFAULT_MIME_TYPE.to_string(),
        }
    }

    /// Reference suitable for direct display: the URL itself or a `data:` URI.
    pub fn display_src(&self) -> String {
        match self {
            ImageSource::RemoteUrl(url) => url.clone(),
            ImageSource::InlineData { base64, mime_type } => {
                format!("data:{mime_type};base64,{base64}")
            }
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, ImageSource::RemoteUrl(_))
    }
}

/// Filename for saving `source`: `ai-image-<timestamp>.<ext>` for inline data,
/// `None` for remote URLs so the saver can apply its default naming.
pub fn download_filename(source: &ImageSource, timestamp_millis: i64) -> Option<String> {
    match source {
        ImageSource::RemoteUrl(_) => None,
        ImageSource::InlineData { mime_type, .. } => Some(timestamped_name(
            timestamp_millis,
            extension_for_mime(mime_type),
        )),
    }
}

/// Default naming for remote images: the last path segment of the URL, or the
/// timestamp pattern when the URL has no usable segment.
pub fn default_remote_filename(url: &str, timestamp_millis: i64) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back().map(ToOwned::to_owned))
        })
        .filter(|segment| is_safe_segment(segment))
        .unwrap_or_else(|| timestamped_name(timestamp_millis, "png"))
}

fn timestamped_name(timestamp_millis: i64, extension: &str) -> String {
    format!("ai-image-{timestamp_millis}.{extension}")
}

fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "png",
    }
}

fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment
            .chars()
            .any(|c| matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'))
}

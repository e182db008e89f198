use imagegen_logging::imagegen_debug;
use serde_json::{Map, Value};

use crate::ImageSource;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized image response shape")]
pub struct UnrecognizedResponseShape;

type Probe = fn(&Map<String, Value>) -> Option<ImageSource>;

/// Response dialects in priority order. The first probe that yields a source
/// wins, even if a later one would also match.
const DIALECTS: &[(&str, Probe)] = &[
    ("imageUrl", probe_image_url as Probe),
    ("image_base64", probe_image_base64 as Probe),
    ("images[0]", probe_images_array as Probe),
    ("data[0]", probe_data_array as Probe),
];

/// Extracts the displayable image from an image API response of unknown shape.
pub fn extract_image_source(response: &Value) -> Result<ImageSource, UnrecognizedResponseShape> {
    let object = response.as_object().ok_or(UnrecognizedResponseShape)?;
    for (name, probe) in DIALECTS {
        if let Some(source) = probe(object) {
            imagegen_debug!("image response matched dialect {name}");
            return Ok(source);
        }
    }
    Err(UnrecognizedResponseShape)
}

fn probe_image_url(object: &Map<String, Value>) -> Option<ImageSource> {
    string_field(object, "imageUrl").map(|url| ImageSource::RemoteUrl(url.to_owned()))
}

fn probe_image_base64(object: &Map<String, Value>) -> Option<ImageSource> {
    string_field(object, "image_base64").map(ImageSource::inline_png)
}

fn probe_images_array(object: &Map<String, Value>) -> Option<ImageSource> {
    match first_element(object, "images")? {
        Value::String(text) if text.is_empty() => None,
        Value::String(text) if text.starts_with("http") => {
            Some(ImageSource::RemoteUrl(text.clone()))
        }
        Value::String(text) => Some(ImageSource::inline_png(text.as_str())),
        Value::Object(item) => string_field(item, "url")
            .map(|url| ImageSource::RemoteUrl(url.to_owned()))
            .or_else(|| string_field(item, "base64").map(ImageSource::inline_png)),
        _ => None,
    }
}

fn probe_data_array(object: &Map<String, Value>) -> Option<ImageSource> {
    let item = first_element(object, "data")?.as_object()?;
    string_field(item, "url")
        .map(|url| ImageSource::RemoteUrl(url.to_owned()))
        .or_else(|| string_field(item, "b64_json").map(ImageSource::inline_png))
}

/// Empty strings count as absent.
fn string_field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}

fn first_element<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).and_then(Value::as_array).and_then(|items| items.first())
}

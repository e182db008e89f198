use std::fmt;

/// Aspect ratio used when nothing was chosen or restored.
pub const DEFAULT_ASPECT: &str = "1:1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageSize {
    #[default]
    Square,
    Landscape,
    Portrait,
}

impl ImageSize {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageSize::Square => "1024x1024",
            ImageSize::Landscape => "1792x1024",
            ImageSize::Portrait => "1024x1792",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    Low,
    #[default]
    Medium,
    High,
}

impl Quality {
    pub fn as_str(self) -> &'static str {
        match self {
            Quality::Low => "low",
            Quality::Medium => "medium",
            Quality::High => "high",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps the aspect-ratio control onto one of the supported pixel sizes.
/// Unknown ratios fall back to the square size.
pub fn map_aspect_to_size(aspect: &str) -> ImageSize {
    match aspect.trim() {
        "16:9" | "3:2" => ImageSize::Landscape,
        "9:16" => ImageSize::Portrait,
        _ => ImageSize::Square,
    }
}

/// Maps the guidance slider onto a quality tier. NaN lands in `Low`.
pub fn map_guidance_to_quality(value: f64) -> Quality {
    if value >= 15.0 {
        Quality::High
    } else if value >= 8.0 {
        Quality::Medium
    } else {
        Quality::Low
    }
}

/// A single submission to the image API. Size and quality only ever come
/// from the mappers above, so the fields stay private.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    prompt: String,
    negative_prompt: Option<String>,
    size: ImageSize,
    quality: Quality,
}

impl GenerationRequest {
    /// Builds a request from raw form values. Returns `None` when the trimmed
    /// prompt is empty; a blank negative prompt is dropped.
    pub fn from_form(
        prompt: &str,
        negative_prompt: &str,
        aspect: &str,
        guidance: f64,
    ) -> Option<Self> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return None;
        }
        let negative_prompt = Some(negative_prompt.trim())
            .filter(|text| !text.is_empty())
            .map(ToOwned::to_owned);
        Some(Self {
            prompt: prompt.to_owned(),
            negative_prompt,
            size: map_aspect_to_size(aspect),
            quality: map_guidance_to_quality(guidance),
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn negative_prompt(&self) -> Option<&str> {
        self.negative_prompt.as_deref()
    }

    pub fn size(&self) -> ImageSize {
        self.size
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratios_map_to_sizes() {
        assert_eq!(map_aspect_to_size("16:9"), ImageSize::Landscape);
        assert_eq!(map_aspect_to_size("9:16"), ImageSize::Portrait);
        assert_eq!(map_aspect_to_size("3:2"), ImageSize::Landscape);
        assert_eq!(map_aspect_to_size("1:1"), ImageSize::Square);
        assert_eq!(map_aspect_to_size("4:3"), ImageSize::Square);
        assert_eq!(map_aspect_to_size(""), ImageSize::Square);
    }

    #[test]
    fn guidance_boundaries() {
        assert_eq!(map_guidance_to_quality(-5.0), Quality::Low);
        assert_eq!(map_guidance_to_quality(7.99), Quality::Low);
        assert_eq!(map_guidance_to_quality(8.0), Quality::Medium);
        assert_eq!(map_guidance_to_quality(14.9), Quality::Medium);
        assert_eq!(map_guidance_to_quality(15.0), Quality::High);
        assert_eq!(map_guidance_to_quality(100.0), Quality::High);
        assert_eq!(map_guidance_to_quality(f64::NAN), Quality::Low);
        assert_eq!(map_guidance_to_quality(f64::INFINITY), Quality::High);
    }

    #[test]
    fn wire_strings() {
        assert_eq!(ImageSize::Portrait.to_string(), "1024x1792");
        assert_eq!(Quality::High.to_string(), "high");
    }

    #[test]
    fn blank_prompt_builds_no_request() {
        assert!(GenerationRequest::from_form("  \n ", "", "1:1", 10.0).is_none());
    }

    #[test]
    fn request_trims_and_drops_blank_negative_prompt() {
        let request = GenerationRequest::from_form("  a cat ", "   ", "9:16", 20.0).unwrap();
        assert_eq!(request.prompt(), "a cat");
        assert_eq!(request.negative_prompt(), None);
        assert_eq!(request.size(), ImageSize::Portrait);
        assert_eq!(request.quality(), Quality::High);
    }
}

use crate::{ImageSize, Quality};

pub const FAILED_TITLE: &str = "Generation failed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewView {
    Placeholder { message: String },
    Loading { message: String },
    Image { src: String, remote: bool },
    Error { title: String, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppViewModel {
    pub prompt: String,
    pub negative_prompt: String,
    pub aspect: String,
    pub guidance: f64,
    pub size: ImageSize,
    pub quality: Quality,
    pub preview: PreviewView,
    pub download_enabled: bool,
    pub submit_enabled: bool,
    pub saving: bool,
    pub last_saved: Option<String>,
    pub download_error: Option<String>,
}

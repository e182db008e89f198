use crate::view_model::{AppViewModel, PreviewView, FAILED_TITLE};
use crate::{
    map_aspect_to_size, map_guidance_to_quality, GenerationRequest, ImageSource,
    PersistedFormState, DEFAULT_ASPECT,
};

/// Identifies one submission. Tokens increase monotonically; only the most
/// recently issued one may resolve the preview.
pub type RequestToken = u64;

pub const PLACEHOLDER_MESSAGE: &str = "Your generated image will appear here.";
pub const GENERATING_MESSAGE: &str = "Generating image...";

const DEFAULT_GUIDANCE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewState {
    Placeholder(String),
    Loading(String),
    Displaying(ImageSource),
    Failed(String),
}

impl Default for PreviewState {
    fn default() -> Self {
        PreviewState::Placeholder(PLACEHOLDER_MESSAGE.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    prompt: String,
    negative_prompt: String,
    aspect: String,
    guidance: f64,
    preview: PreviewState,
    current_token: Option<RequestToken>,
    next_token: RequestToken,
    saving: bool,
    last_saved: Option<String>,
    download_error: Option<String>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            negative_prompt: String::new(),
            aspect: DEFAULT_ASPECT.to_string(),
            guidance: DEFAULT_GUIDANCE,
            preview: PreviewState::default(),
            current_token: None,
            next_token: 1,
            saving: false,
            last_saved: None,
            download_error: None,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let preview = match &self.preview {
            PreviewState::Placeholder(message) => PreviewView::Placeholder {
                message: message.clone(),
            },
            PreviewState::Loading(message) => PreviewView::Loading {
                message: message.clone(),
            },
            PreviewState::Displaying(source) => PreviewView::Image {
                src: source.display_src(),
                remote: source.is_remote(),
            },
            PreviewState::Failed(message) => PreviewView::Error {
                title: FAILED_TITLE.to_string(),
                message: message.clone(),
            },
        };

        AppViewModel {
            prompt: self.prompt.clone(),
            negative_prompt: self.negative_prompt.clone(),
            aspect: self.aspect.clone(),
            guidance: self.guidance,
            size: map_aspect_to_size(&self.aspect),
            quality: map_guidance_to_quality(self.guidance),
            preview,
            download_enabled: self.download_enabled(),
            submit_enabled: self.submit_enabled(),
            saving: self.saving,
            last_saved: self.last_saved.clone(),
            download_error: self.download_error.clone(),
        }
    }

    pub fn preview(&self) -> &PreviewState {
        &self.preview
    }

    /// The image currently on display, if any.
    pub fn current_source(&self) -> Option<&ImageSource> {
        match &self.preview {
            PreviewState::Displaying(source) => Some(source),
            _ => None,
        }
    }

    pub fn current_token(&self) -> Option<RequestToken> {
        self.current_token
    }

    pub fn download_enabled(&self) -> bool {
        matches!(self.preview, PreviewState::Displaying(_))
    }

    pub fn submit_enabled(&self) -> bool {
        !matches!(self.preview, PreviewState::Loading(_))
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Returns whether anything changed since the last call, clearing the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_prompt(&mut self, prompt: String) {
        if self.prompt != prompt {
            self.prompt = prompt;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_negative_prompt(&mut self, negative_prompt: String) {
        if self.negative_prompt != negative_prompt {
            self.negative_prompt = negative_prompt;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_aspect(&mut self, aspect: String) {
        if self.aspect != aspect {
            self.aspect = aspect;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_guidance(&mut self, guidance: f64) {
        if self.guidance.to_bits() != guidance.to_bits() {
            self.guidance = guidance;
            self.mark_dirty();
        }
    }

    pub(crate) fn apply_restore(&mut self, restored: PersistedFormState) {
        if let Some(prompt) = restored.prompt {
            self.set_prompt(prompt);
        }
        if let Some(aspect) = restored.aspect {
            self.set_aspect(aspect);
        }
    }

    pub(crate) fn build_request(&self) -> Option<GenerationRequest> {
        GenerationRequest::from_form(
            &self.prompt,
            &self.negative_prompt,
            &self.aspect,
            self.guidance,
        )
    }

    pub(crate) fn aspect(&self) -> &str {
        &self.aspect
    }

    /// Enters `Loading` under a fresh token, dropping the previous result.
    pub(crate) fn begin_generation(&mut self) -> RequestToken {
        let token = self.next_token;
        self.next_token += 1;
        self.current_token = Some(token);
        self.preview = PreviewState::Loading(GENERATING_MESSAGE.to_string());
        self.saving = false;
        self.last_saved = None;
        self.download_error = None;
        self.mark_dirty();
        token
    }

    /// Resolves the in-flight generation. Returns `false` for stale tokens or
    /// completions arriving outside `Loading`.
    pub(crate) fn complete_generation(
        &mut self,
        token: RequestToken,
        result: Result<ImageSource, String>,
    ) -> bool {
        if !self.is_current_loading(token) {
            return false;
        }
        self.preview = match result {
            Ok(source) => PreviewState::Displaying(source),
            Err(message) => PreviewState::Failed(message),
        };
        self.mark_dirty();
        true
    }

    pub(crate) fn begin_save(&mut self) -> Option<(RequestToken, ImageSource)> {
        if self.saving {
            return None;
        }
        let token = self.current_token?;
        let source = self.current_source()?.clone();
        self.saving = true;
        self.download_error = None;
        self.mark_dirty();
        Some((token, source))
    }

    pub(crate) fn finish_save(&mut self, token: RequestToken, result: Result<String, String>) {
        if self.current_token != Some(token) || !self.saving {
            return;
        }
        self.saving = false;
        match result {
            Ok(path) => self.last_saved = Some(path),
            Err(message) => self.download_error = Some(message),
        }
        self.mark_dirty();
    }

    fn is_current_loading(&self, token: RequestToken) -> bool {
        self.current_token == Some(token) && matches!(self.preview, PreviewState::Loading(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the prompt text.
    PromptChanged(String),
    /// User edited the negative prompt text.
    NegativePromptChanged(String),
    /// User picked an aspect ratio such as `16:9`.
    AspectChanged(String),
    /// User moved the guidance slider.
    GuidanceChanged(f64),
    /// Restore the last-used form values read at startup.
    RestoreForm(crate::PersistedFormState),
    /// User submitted the form.
    Submitted,
    /// The image API answered and the response was normalized.
    GenerationSucceeded {
        token: crate::RequestToken,
        source: crate::ImageSource,
    },
    /// The request failed or the response shape was not recognized.
    GenerationFailed {
        token: crate::RequestToken,
        message: String,
    },
    /// User clicked Download.
    DownloadClicked,
    /// The current image was written to disk.
    DownloadFinished {
        token: crate::RequestToken,
        path: String,
    },
    DownloadFailed {
        token: crate::RequestToken,
        message: String,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}

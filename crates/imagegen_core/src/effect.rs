use crate::{GenerationRequest, ImageSource, RequestToken};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    PersistForm { prompt: String, aspect: String },
    StartGeneration {
        token: RequestToken,
        request: GenerationRequest,
    },
    SaveImage {
        token: RequestToken,
        source: ImageSource,
    },
}

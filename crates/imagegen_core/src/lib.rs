//! Image generator core: pure preview state machine, request mapping and
//! response normalization.
mod effect;
mod form;
mod msg;
mod normalize;
mod params;
mod source;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use form::{
    persist_form, restore_form, KeyValueStore, MemoryStore, PersistedFormState, ASPECT_KEY,
    PROMPT_KEY,
};
pub use msg::Msg;
pub use normalize::{extract_image_source, UnrecognizedResponseShape};
pub use params::{
    map_aspect_to_size, map_guidance_to_quality, GenerationRequest, ImageSize, Quality,
    DEFAULT_ASPECT,
};
pub use source::{default_remote_filename, download_filename, ImageSource, DEFAULT_MIME_TYPE};
pub use state::{AppState, PreviewState, RequestToken, GENERATING_MESSAGE, PLACEHOLDER_MESSAGE};
pub use update::update;
pub use view_model::{AppViewModel, PreviewView, FAILED_TITLE};

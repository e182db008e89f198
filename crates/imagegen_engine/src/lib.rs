//! Image generator engine: HTTP client, image saving and effect execution.
mod client;
mod engine;
mod persist;
mod save;
mod types;

pub use client::{
    ClientSettings, ImageGenerator, ReqwestImageGenerator, DEFAULT_ENDPOINT, DEFAULT_MODEL,
};
pub use engine::EngineHandle;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use save::{ImageSaver, SaveSettings};
pub use types::{EngineEvent, FailureKind, GenerationError, SaveError};

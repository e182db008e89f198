use std::time::Duration;

use chrono::Utc;
use imagegen_core::{persist_form, Effect, KeyValueStore, Msg};
use imagegen_engine::{EngineEvent, EngineHandle};
use imagegen_logging::{imagegen_info, imagegen_warn};

/// Executes core effects against the engine and the form store, and turns
/// engine events back into messages.
pub struct EffectRunner<S: KeyValueStore> {
    engine: EngineHandle,
    store: S,
}

impl<S: KeyValueStore> EffectRunner<S> {
    pub fn new(engine: EngineHandle, store: S) -> Self {
        Self { engine, store }
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::PersistForm { prompt, aspect } => {
                    persist_form(&mut self.store, &prompt, &aspect);
                }
                Effect::StartGeneration { token, request } => {
                    imagegen_info!(
                        "StartGeneration token={} prompt_len={}",
                        token,
                        request.prompt().len()
                    );
                    self.engine.generate(token, request);
                }
                Effect::SaveImage { token, source } => {
                    imagegen_info!("SaveImage token={} remote={}", token, source.is_remote());
                    self.engine
                        .save(token, source, Utc::now().timestamp_millis());
                }
            }
        }
    }

    pub fn next_msg(&self, wait: Duration) -> Msg {
        match self.engine.recv_timeout(wait) {
            Some(event) => map_event(event),
            None => Msg::Tick,
        }
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::GenerationCompleted { token, result } => match result {
            Ok(source) => Msg::GenerationSucceeded { token, source },
            Err(err) => {
                imagegen_warn!("Generation {} failed ({}): {}", token, err.kind, err.message);
                Msg::GenerationFailed {
                    token,
                    message: err.message,
                }
            }
        },
        EngineEvent::SaveCompleted { token, result } => match result {
            Ok(path) => Msg::DownloadFinished {
                token,
                path: path.display().to_string(),
            },
            Err(err) => {
                imagegen_warn!("Saving image for {} failed: {}", token, err);
                Msg::DownloadFailed {
                    token,
                    message: err.to_string(),
                }
            }
        },
    }
}

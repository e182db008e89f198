use imagegen_logging::{imagegen_debug, imagegen_info};

use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::PromptChanged(text) => {
            state.set_prompt(text);
            Vec::new()
        }
        Msg::NegativePromptChanged(text) => {
            state.set_negative_prompt(text);
            Vec::new()
        }
        Msg::AspectChanged(aspect) => {
            state.set_aspect(aspect);
            Vec::new()
        }
        Msg::GuidanceChanged(value) => {
            state.set_guidance(value);
            Vec::new()
        }
        Msg::RestoreForm(restored) => {
            state.apply_restore(restored);
            Vec::new()
        }
        Msg::Submitted => {
            let Some(request) = state.build_request() else {
                imagegen_debug!("submit ignored: prompt is empty");
                return (state, Vec::new());
            };
            // Persisting does not wait on the network outcome.
            let persist = Effect::PersistForm {
                prompt: request.prompt().to_string(),
                aspect: state.aspect().to_string(),
            };
            let token = state.begin_generation();
            imagegen_info!(
                "submit token={} size={} quality={}",
                token,
                request.size(),
                request.quality()
            );
            vec![persist, Effect::StartGeneration { token, request }]
        }
        Msg::GenerationSucceeded { token, source } => {
            if !state.complete_generation(token, Ok(source)) {
                imagegen_debug!("ignoring stale success for token {}", token);
            }
            Vec::new()
        }
        Msg::GenerationFailed { token, message } => {
            if !state.complete_generation(token, Err(message)) {
                imagegen_debug!("ignoring stale failure for token {}", token);
            }
            Vec::new()
        }
        Msg::DownloadClicked => match state.begin_save() {
            Some((token, source)) => vec![Effect::SaveImage { token, source }],
            None => Vec::new(),
        },
        Msg::DownloadFinished { token, path } => {
            state.finish_save(token, Ok(path));
            Vec::new()
        }
        Msg::DownloadFailed { token, message } => {
            state.finish_save(token, Err(message));
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

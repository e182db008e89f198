use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use imagegen_core::{
    restore_form, update, AppState, KeyValueStore, Msg, PreviewState, DEFAULT_ASPECT,
};
use imagegen_engine::EngineHandle;
use imagegen_logging::imagegen_debug;

use crate::cli::{Cli, Command, GenerateArgs, MissingApiKey};
use crate::effects::EffectRunner;
use crate::persistence::RonFileStore;
use crate::render::TerminalRenderer;

const TICK: Duration = Duration::from_millis(75);

/// Save failures, nothing to generate, engine start-up.
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_MISSING_API_KEY: u8 = 2;
pub const EXIT_GENERATION_FAILED: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Displayed,
    Saved(PathBuf),
    SaveFailed,
    GenerationFailed,
}

impl Outcome {
    pub fn exit_status(&self) -> u8 {
        match self {
            Outcome::Displayed | Outcome::Saved(_) => 0,
            Outcome::SaveFailed => EXIT_FAILURE,
            Outcome::GenerationFailed => EXIT_GENERATION_FAILED,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

/// Exit status for an error that stopped the run before an outcome existed.
pub fn error_exit_status(err: &anyhow::Error) -> u8 {
    if err.is::<MissingApiKey>() {
        EXIT_MISSING_API_KEY
    } else {
        EXIT_FAILURE
    }
}

pub fn run(cli: Cli) -> Result<Outcome> {
    match &cli.command {
        Command::Last => {
            let store = RonFileStore::open(cli.state_file.clone());
            print_last(&store);
            Ok(Outcome::Displayed)
        }
        Command::Generate(args) => {
            let client = cli.client_settings()?;
            let engine = EngineHandle::new(client, args.save_settings())
                .context("failed to start the generation engine")?;
            let store = RonFileStore::open(cli.state_file.clone());
            run_generation(engine, store, args)
        }
    }
}

fn print_last(store: &dyn KeyValueStore) {
    let restored = restore_form(store);
    println!("Prompt: {}", restored.prompt.as_deref().unwrap_or("(none)"));
    println!(
        "Aspect: {}",
        restored.aspect.as_deref().unwrap_or(DEFAULT_ASPECT)
    );
}

/// Restores the last form, applies the command-line values on top, submits
/// and drives the engine until the image is shown (and saved unless
/// `--no-save`) or the request failed.
fn run_generation<S: KeyValueStore>(
    engine: EngineHandle,
    store: S,
    args: &GenerateArgs,
) -> Result<Outcome> {
    let restored = restore_form(&store);

    let mut app = App::new(EffectRunner::new(engine, store));
    app.dispatch(Msg::RestoreForm(restored));
    if let Some(prompt) = &args.prompt {
        app.dispatch(Msg::PromptChanged(prompt.clone()));
    }
    if let Some(negative) = &args.negative {
        app.dispatch(Msg::NegativePromptChanged(negative.clone()));
    }
    if let Some(aspect) = &args.aspect {
        app.dispatch(Msg::AspectChanged(aspect.clone()));
    }
    app.dispatch(Msg::GuidanceChanged(args.guidance));

    app.live = true;
    app.dispatch(Msg::Submitted);
    if !matches!(app.state.preview(), PreviewState::Loading(_)) {
        bail!("nothing to generate: pass a prompt (no previous prompt was remembered)");
    }

    Ok(app.run_until_settled(!args.no_save))
}

struct App<S: KeyValueStore> {
    state: AppState,
    runner: EffectRunner<S>,
    renderer: TerminalRenderer,
    live: bool,
}

impl<S: KeyValueStore> App<S> {
    fn new(runner: EffectRunner<S>) -> Self {
        Self {
            state: AppState::new(),
            runner,
            renderer: TerminalRenderer::default(),
            live: false,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        let view = state.view();
        self.state = state;
        self.runner.enqueue(effects);

        if was_dirty && self.live {
            self.renderer.render(&view);
        }
    }

    /// Pumps engine events until the preview settles and, when requested,
    /// the displayed image has been written to disk.
    fn run_until_settled(&mut self, save: bool) -> Outcome {
        let mut download_requested = false;
        loop {
            let displaying = match self.state.preview() {
                PreviewState::Failed(_) => return Outcome::GenerationFailed,
                PreviewState::Displaying(_) => true,
                _ => false,
            };

            if displaying {
                if !save {
                    return Outcome::Displayed;
                }
                if !download_requested {
                    download_requested = true;
                    self.dispatch(Msg::DownloadClicked);
                    continue;
                }
                if !self.state.is_saving() {
                    return match self.state.view().last_saved {
                        Some(path) => Outcome::Saved(PathBuf::from(path)),
                        None => Outcome::SaveFailed,
                    };
                }
            }

            let msg = self.runner.next_msg(TICK);
            if msg != Msg::Tick {
                imagegen_debug!("engine message: {:?}", msg);
            }
            self.dispatch(msg);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::{Arc, Mutex};

    use imagegen_core::{
        persist_form, GenerationRequest, ImageSize, ImageSource, MemoryStore, Quality,
    };
    use imagegen_engine::{FailureKind, GenerationError, ImageGenerator, ImageSaver, SaveSettings};
    use tempfile::TempDir;

    use super::*;

    /// Replies with a fixed result and keeps the requests it received.
    struct FixedGenerator {
        reply: Result<ImageSource, GenerationError>,
        seen: Arc<Mutex<Vec<GenerationRequest>>>,
    }

    #[async_trait::async_trait]
    impl ImageGenerator for FixedGenerator {
        async fn generate(
            &self,
            request: &GenerationRequest,
        ) -> Result<ImageSource, GenerationError> {
            self.seen.lock().unwrap().push(request.clone());
            self.reply.clone()
        }
    }

    struct Harness {
        out_dir: TempDir,
        seen: Arc<Mutex<Vec<GenerationRequest>>>,
        engine: EngineHandle,
    }

    fn harness(reply: Result<ImageSource, GenerationError>) -> Harness {
        imagegen_logging::initialize_for_tests();
        let out_dir = TempDir::new().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let generator = FixedGenerator {
            reply,
            seen: seen.clone(),
        };
        let engine = EngineHandle::with_generator(
            Arc::new(generator),
            ImageSaver::new(SaveSettings::new(out_dir.path())),
        )
        .unwrap();
        Harness {
            out_dir,
            seen,
            engine,
        }
    }

    fn args(prompt: Option<&str>, no_save: bool, out_dir: &TempDir) -> GenerateArgs {
        GenerateArgs {
            prompt: prompt.map(str::to_string),
            negative: None,
            aspect: None,
            guidance: 10.0,
            no_save,
            out_dir: out_dir.path().to_path_buf(),
        }
    }

    #[test]
    fn displayed_image_is_saved_to_the_output_dir() {
        let h = harness(Ok(ImageSource::inline_png("aGVsbG8=")));
        let args = args(Some("a cat"), false, &h.out_dir);

        let outcome = run_generation(h.engine, MemoryStore::new(), &args).unwrap();

        let Outcome::Saved(path) = &outcome else {
            panic!("expected a saved image, got {outcome:?}");
        };
        assert!(path.starts_with(h.out_dir.path()));
        assert_eq!(fs::read(path).unwrap(), b"hello");
        assert_eq!(outcome.exit_status(), 0);
    }

    #[test]
    fn no_save_stops_once_displayed() {
        let h = harness(Ok(ImageSource::RemoteUrl(
            "https://img.example/cat.png".to_string(),
        )));
        let args = args(Some("a cat"), true, &h.out_dir);

        let outcome = run_generation(h.engine, MemoryStore::new(), &args).unwrap();

        assert_eq!(outcome, Outcome::Displayed);
        assert_eq!(fs::read_dir(h.out_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn failed_generation_exits_with_its_own_status() {
        let h = harness(Err(GenerationError {
            kind: FailureKind::HttpStatus(429),
            message: "quota exceeded".to_string(),
        }));
        let args = args(Some("a cat"), false, &h.out_dir);

        let outcome = run_generation(h.engine, MemoryStore::new(), &args).unwrap();

        assert_eq!(outcome, Outcome::GenerationFailed);
        assert_eq!(outcome.exit_status(), EXIT_GENERATION_FAILED);
    }

    #[test]
    fn undecodable_image_is_a_save_failure() {
        let h = harness(Ok(ImageSource::inline_png("%%% not base64")));
        let args = args(Some("a cat"), false, &h.out_dir);

        let outcome = run_generation(h.engine, MemoryStore::new(), &args).unwrap();

        assert_eq!(outcome, Outcome::SaveFailed);
        assert_eq!(outcome.exit_status(), EXIT_FAILURE);
    }

    #[test]
    fn command_line_values_override_the_restored_form() {
        let h = harness(Ok(ImageSource::inline_png("aGVsbG8=")));
        let mut store = MemoryStore::new();
        persist_form(&mut store, "a remembered lighthouse", "16:9");
        let mut args = args(None, true, &h.out_dir);
        args.aspect = Some("9:16".to_string());
        args.guidance = 20.0;

        let outcome = run_generation(h.engine, store, &args).unwrap();

        assert_eq!(outcome, Outcome::Displayed);
        let seen = h.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].prompt(), "a remembered lighthouse");
        assert_eq!(seen[0].size(), ImageSize::Portrait);
        assert_eq!(seen[0].quality(), Quality::High);
    }

    #[test]
    fn blank_prompt_with_nothing_remembered_is_an_error() {
        let h = harness(Ok(ImageSource::inline_png("aGVsbG8=")));
        let args = args(Some("   "), false, &h.out_dir);

        let err = run_generation(h.engine, MemoryStore::new(), &args).unwrap_err();

        assert!(err.to_string().contains("nothing to generate"));
        assert_eq!(error_exit_status(&err), EXIT_FAILURE);
        assert!(h.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn missing_api_key_has_its_own_exit_status() {
        let err = anyhow::Error::new(MissingApiKey);
        assert_eq!(error_exit_status(&err), EXIT_MISSING_API_KEY);
    }
}

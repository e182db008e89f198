use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use imagegen_core::{GenerationRequest, ImageSource, RequestToken};
use imagegen_logging::imagegen_debug;

use crate::client::{ClientSettings, ImageGenerator, ReqwestImageGenerator};
use crate::save::{ImageSaver, SaveSettings};
use crate::EngineEvent;

enum EngineCommand {
    Generate {
        token: RequestToken,
        request: GenerationRequest,
    },
    Save {
        token: RequestToken,
        source: ImageSource,
        timestamp_millis: i64,
    },
}

/// Runs generation and save requests on a worker thread with its own tokio
/// runtime. Completions come back tagged with the token they were issued under;
/// deciding whether a completion is stale is left to the caller.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(client: ClientSettings, save: SaveSettings) -> io::Result<Self> {
        Self::with_generator(
            Arc::new(ReqwestImageGenerator::new(client)),
            ImageSaver::new(save),
        )
    }

    pub fn with_generator(
        generator: Arc<dyn ImageGenerator>,
        saver: ImageSaver,
    ) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let saver = Arc::new(saver);

        thread::Builder::new()
            .name("imagegen-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let generator = generator.clone();
                    let saver = saver.clone();
                    let event_tx = event_tx.clone();
                    runtime.spawn(async move {
                        handle_command(generator.as_ref(), saver.as_ref(), command, event_tx)
                            .await;
                    });
                }
                imagegen_debug!("engine command channel closed");
            })?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn generate(&self, token: RequestToken, request: GenerationRequest) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::Generate { token, request });
    }

    pub fn save(&self, token: RequestToken, source: ImageSource, timestamp_millis: i64) {
        let _ = self.cmd_tx.send(EngineCommand::Save {
            token,
            source,
            timestamp_millis,
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    generator: &dyn ImageGenerator,
    saver: &ImageSaver,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Generate { token, request } => {
            let result = generator.generate(&request).await;
            imagegen_debug!("generation token={} ok={}", token, result.is_ok());
            let _ = event_tx.send(EngineEvent::GenerationCompleted { token, result });
        }
        EngineCommand::Save {
            token,
            source,
            timestamp_millis,
        } => {
            let result = saver.save(&source, timestamp_millis).await;
            let _ = event_tx.send(EngineEvent::SaveCompleted { token, result });
        }
    }
}

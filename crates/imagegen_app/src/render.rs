use imagegen_core::{AppViewModel, PreviewView};

const MAX_INLINE_PREVIEW: usize = 64;

/// Builds the terminal frame for a view model.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(format!("Prompt: {}", view.prompt.trim()));
    if !view.negative_prompt.trim().is_empty() {
        lines.push(format!("Avoid: {}", view.negative_prompt.trim()));
    }
    lines.push(format!(
        "Aspect: {} ({}) | Quality: {}",
        view.aspect, view.size, view.quality
    ));

    match &view.preview {
        PreviewView::Placeholder { message } | PreviewView::Loading { message } => {
            lines.push(message.clone());
        }
        PreviewView::Image { src, remote } => {
            if *remote {
                lines.push(format!("Image: {src}"));
            } else {
                lines.push(format!("Image: {}", shorten(src)));
            }
        }
        PreviewView::Error { title, message } => {
            lines.push(format!("{title}: {message}"));
        }
    }

    let download = if view.saving {
        "saving..."
    } else if view.download_enabled {
        "available"
    } else {
        "unavailable"
    };
    lines.push(format!("Download: {download}"));

    if let Some(path) = &view.last_saved {
        lines.push(format!("Saved to: {path}"));
    }
    if let Some(err) = &view.download_error {
        lines.push(format!("Save failed: {err}"));
    }

    lines
}

/// Keeps the last frame and prints only frames that differ from it.
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    last_frame: Vec<String>,
}

impl TerminalRenderer {
    pub fn render(&mut self, view: &AppViewModel) {
        let frame = render(view);
        if frame == self.last_frame {
            return;
        }
        println!();
        for line in &frame {
            println!("{line}");
        }
        self.last_frame = frame;
    }
}

fn shorten(src: &str) -> String {
    if src.len() <= MAX_INLINE_PREVIEW {
        return src.to_string();
    }
    let mut end = MAX_INLINE_PREVIEW;
    while end > 0 && !src.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... ({} bytes)", &src[..end], src.len())
}

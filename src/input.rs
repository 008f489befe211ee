use std::io;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine};
use crossterm::event::KeyEvent;
use ratatui::widgets::{Block, Borders};
use thiserror::Error;
use tui_textarea::TextArea;

use crate::constants::MAX_IMAGE_BYTES;

const PLACEHOLDER: &str = "Ask something about your image or just chat...";

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("Image size must be less than 10MB")]
    TooLarge { size: u64 },
    #[error("Please select a valid image file")]
    NotAnImage { mime: Option<String> },
    #[error("{} is not a file", .0.display())]
    NotAFile(PathBuf),
    #[error("Could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reads the MIME type and payload size of a base64 data URL without
/// decoding it.
pub fn data_url_info(url: &str) -> Option<(&str, u64)> {
    let (header, payload) = url.strip_prefix("data:")?.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    let padding = payload.bytes().rev().take_while(|&b| b == b'=').count();
    let size = (payload.len() / 4 * 3).checked_sub(padding)?;
    Some((mime, size as u64))
}

/// An image picked by the user, held in memory until it is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub path: PathBuf,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// What the widget hands to its owner on a successful submit.
#[derive(Debug, Clone)]
pub struct Submission {
    pub text: String,
    pub image: Option<ImageAttachment>,
}

/// Work needed to turn a staged image into a data URL preview.
#[derive(Debug)]
pub struct PreviewJob {
    generation: u64,
    mime_type: String,
    bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct PreviewReady {
    pub generation: u64,
    pub data_url: String,
}

impl PreviewJob {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Encodes on the blocking pool; images can be up to 10 MiB.
    pub async fn run(self) -> Result<PreviewReady, tokio::task::JoinError> {
        let PreviewJob {
            generation,
            mime_type,
            bytes,
        } = self;
        let data_url = tokio::task::spawn_blocking(move || {
            format!("data:{};base64,{}", mime_type, STANDARD.encode(&bytes))
        })
        .await?;
        Ok(PreviewReady {
            generation,
            data_url,
        })
    }
}

/// Checks size first, then type.
pub fn validate_image(size: u64, mime: Option<&str>) -> Result<String, AttachmentError> {
    if size > MAX_IMAGE_BYTES {
        return Err(AttachmentError::TooLarge { size });
    }
    match mime {
        Some(mime) if mime.starts_with("image/") => Ok(mime.to_string()),
        other => Err(AttachmentError::NotAnImage {
            mime: other.map(str::to_string),
        }),
    }
}

/// The path prompt opened with Ctrl+O. Like a browser file input it keeps
/// its last value, and choosing that same value again is not a change.
pub struct FilePicker {
    field: TextArea<'static>,
    open: bool,
    value: Option<PathBuf>,
}

impl FilePicker {
    fn new() -> Self {
        Self {
            field: picker_field(),
            open: false,
            value: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.field = picker_field();
        if let Some(value) = &self.value {
            self.field.insert_str(value.to_string_lossy());
        }
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn value(&self) -> Option<&Path> {
        self.value.as_deref()
    }

    pub fn field(&self) -> &TextArea<'static> {
        &self.field
    }

    pub fn input_key(&mut self, key: KeyEvent) {
        self.field.input(key);
    }

    /// Closes the prompt and returns the chosen path when it differs from
    /// the current value.
    pub fn confirm(&mut self) -> Option<PathBuf> {
        self.open = false;
        let raw = self.field.lines().join("");
        self.choose(&raw)
    }

    pub fn choose(&mut self, raw: &str) -> Option<PathBuf> {
        let path = normalize_path(raw)?;
        if self.value.as_ref() == Some(&path) {
            tracing::debug!(path = %path.display(), "Picker value unchanged, ignoring");
            return None;
        }
        self.value = Some(path.clone());
        Some(path)
    }

    pub fn reset(&mut self) {
        self.value = None;
        self.field = picker_field();
    }
}

fn picker_field() -> TextArea<'static> {
    let mut field = TextArea::default();
    field.set_block(
        Block::default()
            .borders(Borders::ALL)
            .title("Attach image (Enter to confirm, Esc to cancel)"),
    );
    field.set_placeholder_text("/path/to/image.png");
    field
}

/// Strips quoting and `file://` prefixes that terminals add to dropped paths.
fn normalize_path(raw: &str) -> Option<PathBuf> {
    let trimmed = raw.trim().trim_matches(|c| c == '\'' || c == '"');
    let trimmed = trimmed.strip_prefix("file://").unwrap_or(trimmed);
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}

pub enum PasteOutcome {
    /// The paste named an existing file; treat it as a drop.
    Dropped(PathBuf),
    Inserted,
    Ignored,
}

/// The draft editor: text, one staged image and its preview.
pub struct InputWidget {
    textarea: TextArea<'static>,
    image: Option<ImageAttachment>,
    preview: Option<String>,
    picker: FilePicker,
    disabled: bool,
    generation: u64,
}

impl InputWidget {
    pub fn new() -> Self {
        Self {
            textarea: fresh_textarea(),
            image: None,
            preview: None,
            picker: FilePicker::new(),
            disabled: false,
            generation: 0,
        }
    }

    pub fn text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn textarea(&self) -> &TextArea<'static> {
        &self.textarea
    }

    pub fn textarea_mut(&mut self) -> &mut TextArea<'static> {
        &mut self.textarea
    }

    pub fn image(&self) -> Option<&ImageAttachment> {
        self.image.as_ref()
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    /// MIME type and decoded byte count of the ready preview.
    pub fn preview_info(&self) -> Option<(&str, u64)> {
        self.preview.as_deref().and_then(data_url_info)
    }

    pub fn picker(&self) -> &FilePicker {
        &self.picker
    }

    pub fn picker_mut(&mut self) -> &mut FilePicker {
        &mut self.picker
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Set by the owner while a request is outstanding.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        if disabled {
            self.picker.close();
        }
    }

    /// Whether the send action is currently available.
    pub fn can_send(&self) -> bool {
        !self.disabled && (!self.text().trim().is_empty() || self.image.is_some())
    }

    pub fn set_text(&mut self, text: &str) {
        self.textarea = fresh_textarea();
        self.textarea.insert_str(text);
    }

    pub fn input_key(&mut self, key: KeyEvent) {
        if !self.disabled {
            self.textarea.input(key);
        }
    }

    pub fn insert_text(&mut self, text: &str) {
        if !self.disabled {
            self.textarea.insert_str(text);
        }
    }

    pub fn insert_newline(&mut self) {
        if !self.disabled {
            self.textarea.insert_newline();
        }
    }

    pub fn open_picker(&mut self) {
        if !self.disabled {
            self.picker.open();
        }
    }

    /// Pasted text that names an existing file is a drop; anything else
    /// goes into the draft.
    pub fn handle_paste(&mut self, data: &str) -> PasteOutcome {
        if self.disabled {
            return PasteOutcome::Ignored;
        }
        if !data.contains('\n') {
            if let Some(path) = normalize_path(data) {
                if path.is_file() {
                    return PasteOutcome::Dropped(path);
                }
            }
        }
        self.insert_text(data);
        PasteOutcome::Inserted
    }

    /// Shared validation for the picker and drops. On success the file
    /// replaces any staged image and the returned job derives its preview.
    pub async fn select_image(&mut self, path: &Path) -> Result<PreviewJob, AttachmentError> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|source| AttachmentError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        if !metadata.is_file() {
            return Err(AttachmentError::NotAFile(path.to_path_buf()));
        }

        let guessed = mime_guess::from_path(path).first();
        let mime_type = validate_image(metadata.len(), guessed.as_ref().map(|m| m.essence_str()))?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| AttachmentError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        tracing::info!(path = %path.display(), %mime_type, size = bytes.len(), "Staged image");

        self.generation += 1;
        self.preview = None;
        let job = PreviewJob {
            generation: self.generation,
            mime_type: mime_type.clone(),
            bytes: bytes.clone(),
        };
        self.image = Some(ImageAttachment {
            path: path.to_path_buf(),
            file_name,
            mime_type,
            bytes,
        });
        Ok(job)
    }

    /// Returns false when the preview belongs to an image that has since
    /// been replaced or removed.
    pub fn apply_preview(&mut self, ready: PreviewReady) -> bool {
        if ready.generation != self.generation || self.image.is_none() {
            tracing::debug!(generation = ready.generation, "Discarding stale preview");
            return false;
        }
        self.preview = Some(ready.data_url);
        true
    }

    pub fn remove_image(&mut self) {
        self.image = None;
        self.preview = None;
        self.generation += 1;
        self.picker.reset();
    }

    /// Hands the trimmed draft to the caller and resets. Nothing happens
    /// while disabled or when there is neither text nor an image.
    pub fn submit(&mut self) -> Option<Submission> {
        if self.disabled {
            return None;
        }
        let text = self.text().trim().to_string();
        if text.is_empty() && self.image.is_none() {
            return None;
        }
        let image = self.image.take();
        self.textarea = fresh_textarea();
        self.remove_image();
        Some(Submission { text, image })
    }
}

impl Default for InputWidget {
    fn default() -> Self {
        Self::new()
    }
}

fn fresh_textarea() -> TextArea<'static> {
    let mut textarea = TextArea::default();
    textarea.set_block(Block::default().borders(Borders::ALL).title("Input"));
    textarea.set_placeholder_text(PLACEHOLDER);
    textarea.set_max_histories(100);
    textarea
}

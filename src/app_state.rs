use std::path::PathBuf;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::analysis::{AnalysisClient, AnalysisError, ReplyBody};
use crate::chat::{ChatContainer, Turn, TurnOutcome};
use crate::input::{AttachmentError, InputWidget, PasteOutcome, PreviewJob, PreviewReady};
use crate::message::MessageId;
use crate::ui_components::TranscriptView;

/// Results coming back from background tasks into the UI loop.
#[derive(Debug)]
pub enum AppEvent {
    TurnFinished {
        placeholder: MessageId,
        result: Result<ReplyBody, AnalysisError>,
    },
    PreviewReady(PreviewReady),
}

pub struct App {
    pub chat: ChatContainer,
    pub input: InputWidget,
    pub transcript: TranscriptView,
    pub tick: u64,
    client: AnalysisClient,
    event_tx: mpsc::Sender<AppEvent>,
    event_rx: mpsc::Receiver<AppEvent>,
}

impl App {
    pub fn new(client: AnalysisClient) -> Self {
        let (event_tx, event_rx) = mpsc::channel(100);
        Self {
            chat: ChatContainer::new(),
            input: InputWidget::new(),
            transcript: TranscriptView::new(),
            tick: 0,
            client,
            event_tx,
            event_rx,
        }
    }

    pub fn client(&self) -> &AnalysisClient {
        &self.client
    }

    /// Keeps the input disabled for exactly as long as a request is outstanding.
    fn sync_input(&mut self) {
        self.input.set_disabled(self.chat.is_loading());
    }

    /// Send gesture: take the draft from the widget and start a turn.
    pub fn submit(&mut self) -> bool {
        let Some(submission) = self.input.submit() else {
            return false;
        };
        let started = match self.chat.begin_turn(&submission.text, submission.image) {
            Some(turn) => {
                self.spawn_turn(turn);
                true
            }
            None => false,
        };
        self.sync_input();
        started
    }

    fn spawn_turn(&self, turn: Turn) {
        let Turn {
            placeholder,
            request,
        } = turn;
        let client = self.client.clone();
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            debug!(%placeholder, "Spawning analysis request");
            let result = client.analyze(request).await;
            if tx
                .send(AppEvent::TurnFinished {
                    placeholder,
                    result,
                })
                .await
                .is_err()
            {
                debug!("UI loop gone, dropping analysis result");
            }
        });
    }

    /// Validates and stages an image from the picker or a drop.
    pub async fn attach(&mut self, path: PathBuf) {
        // Rejections surface as notices.
        let _ = self.try_attach(path).await;
    }

    async fn try_attach(&mut self, path: PathBuf) -> Result<(), AttachmentError> {
        if self.input.is_disabled() {
            return Ok(());
        }
        match self.input.select_image(&path).await {
            Ok(job) => {
                self.spawn_preview(job);
                Ok(())
            }
            Err(e) => {
                info!(path = %path.display(), error = %e, "Image rejected");
                self.chat.notices_mut().error(e.to_string());
                Err(e)
            }
        }
    }

    fn spawn_preview(&self, job: PreviewJob) {
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let generation = job.generation();
            match job.run().await {
                Ok(ready) => {
                    if tx.send(AppEvent::PreviewReady(ready)).await.is_err() {
                        debug!(generation, "UI loop gone, dropping preview");
                    }
                }
                Err(e) => error!(generation, error = %e, "Preview task failed"),
            }
        });
    }

    pub async fn confirm_picker(&mut self) {
        if let Some(path) = self.input.picker_mut().confirm() {
            self.attach(path).await;
        }
    }

    /// A rejected drop that was not an image keeps the pasted text in the
    /// draft, since it was most likely a path typed into a question.
    pub async fn paste(&mut self, data: &str) {
        if let PasteOutcome::Dropped(path) = self.input.handle_paste(data) {
            debug!(path = %path.display(), "Paste treated as file drop");
            if let Err(AttachmentError::NotAnImage { .. } | AttachmentError::NotAFile(_)) =
                self.try_attach(path).await
            {
                self.input.insert_text(data);
            }
        }
    }

    pub fn remove_image(&mut self) {
        if !self.input.is_disabled() {
            self.input.remove_image();
        }
    }

    /// Clearing is only offered while there is something to clear.
    pub fn clear_chat(&mut self) {
        if !self.chat.is_empty() {
            self.chat.clear();
        }
    }

    pub fn apply_event(&mut self, event: AppEvent) -> Option<TurnOutcome> {
        let outcome = match event {
            AppEvent::TurnFinished {
                placeholder,
                result,
            } => Some(self.chat.finish_turn(&placeholder, result)),
            AppEvent::PreviewReady(ready) => {
                self.input.apply_preview(ready);
                None
            }
        };
        self.sync_input();
        outcome
    }

    /// Drains finished background work without blocking.
    pub fn process_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.apply_event(event);
        }
    }

    /// Waits for the next background result without applying it.
    pub async fn recv_event(&mut self) -> Option<AppEvent> {
        self.event_rx.recv().await
    }

    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        self.chat.notices_mut().expire(Instant::now());
    }
}

use tracing::{debug, info, warn};

use crate::analysis::{AnalysisClient, AnalysisError, AnalysisRequest, ReplyBody};
use crate::constants::{
    NOTICE_CHAT_CLEARED, NOTICE_REQUEST_FAILED, NOTICE_RESPONSE_RECEIVED, REQUEST_FAILED_REPLY,
};
use crate::input::ImageAttachment;
use crate::message::{ImageRef, Message, MessageId};
use crate::notice::NoticeBoard;

/// A submitted prompt waiting on the analysis endpoint.
#[derive(Debug)]
pub struct Turn {
    pub placeholder: MessageId,
    pub request: AnalysisRequest,
}

/// How a finished turn was reconciled into the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Resolved,
    Failed,
    /// The placeholder was gone (the chat was cleared meanwhile).
    Stale,
}

/// Owns the conversation and the outstanding-request flag.
#[derive(Debug, Default)]
pub struct ChatContainer {
    messages: Vec<Message>,
    loading: bool,
    revision: u64,
    notices: NoticeBoard,
}

impl ChatContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// True while a request is outstanding; the input is disabled for as long as this holds.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Bumped on every change to the message list.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut NoticeBoard {
        &mut self.notices
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Appends the user message and the loading placeholder and marks the
    /// request outstanding. Returns `None` without touching anything when
    /// there is nothing to send or a turn is already in flight.
    pub fn begin_turn(&mut self, text: &str, image: Option<ImageAttachment>) -> Option<Turn> {
        let prompt = text.trim().to_string();
        if prompt.is_empty() && image.is_none() {
            return None;
        }
        if self.loading {
            warn!("Turn rejected, a request is already outstanding");
            return None;
        }

        let image_ref = image.as_ref().map(ImageRef::from);
        self.messages.push(Message::user(prompt.clone(), image_ref));

        let placeholder = Message::placeholder();
        let placeholder_id = placeholder.id.clone();
        self.messages.push(placeholder);
        self.loading = true;
        self.touch();

        info!(placeholder = %placeholder_id, has_image = image.is_some(), "Turn started");

        Some(Turn {
            placeholder: placeholder_id,
            request: AnalysisRequest { prompt, image },
        })
    }

    /// Reconciles a finished request. The outstanding flag is cleared
    /// whatever happens.
    pub fn finish_turn(
        &mut self,
        placeholder: &MessageId,
        result: Result<ReplyBody, AnalysisError>,
    ) -> TurnOutcome {
        self.loading = false;

        let Some(index) = self.messages.iter().position(|m| &m.id == placeholder) else {
            debug!(%placeholder, "Placeholder no longer present, dropping completion");
            return TurnOutcome::Stale;
        };

        match result {
            Ok(reply) => {
                let message = &mut self.messages[index];
                message.content = reply.into_text();
                message.loading = false;
                self.touch();
                info!(%placeholder, "Turn resolved");
                self.notices.success(NOTICE_RESPONSE_RECEIVED);
                TurnOutcome::Resolved
            }
            Err(e) => {
                warn!(%placeholder, error = %e, "Turn failed");
                self.messages.remove(index);
                self.messages.push(Message::error(REQUEST_FAILED_REPLY));
                self.touch();
                self.notices.error(NOTICE_REQUEST_FAILED);
                TurnOutcome::Failed
            }
        }
    }

    /// Runs one full turn against the client, awaiting the response in place.
    pub async fn send_message(
        &mut self,
        client: &AnalysisClient,
        text: &str,
        image: Option<ImageAttachment>,
    ) -> Option<TurnOutcome> {
        let Turn {
            placeholder,
            request,
        } = self.begin_turn(text, image)?;
        let result = client.analyze(request).await;
        Some(self.finish_turn(&placeholder, result))
    }

    /// Drops the whole conversation. In-flight requests are not cancelled.
    pub fn clear(&mut self) {
        info!(count = self.messages.len(), "Clearing chat");
        self.messages.clear();
        self.touch();
        self.notices.success(NOTICE_CHAT_CLEARED);
    }
}

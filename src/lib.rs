pub mod analysis;
pub mod app_state;
pub mod chat;
pub mod config;
pub mod constants;
pub mod events;
pub mod input;
pub mod message;
pub mod notice;
pub mod render;
pub mod ui;
pub mod ui_components;

pub use analysis::{AnalysisClient, AnalysisError, AnalysisRequest, ReplyBody};
pub use chat::{ChatContainer, Turn, TurnOutcome};
pub use config::Config;
pub use input::{AttachmentError, ImageAttachment, InputWidget, Submission};
pub use message::{ImageRef, Message, MessageId, Role};

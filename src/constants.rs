// Defaults for the analysis endpoint, attachment limits and fixed UI strings.

use std::time::Duration;

/// Analysis endpoint used when neither `--endpoint` nor `IMAGECHAT_ENDPOINT` is set.
pub const DEFAULT_ENDPOINT: &str =
    "https://documentanalyzer-q0se.onrender.com/api/v1/documentimage/analysis/from-files";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_LOG_FILE: &str = "imagechat.log";
pub const DEFAULT_LOG_FILTER: &str = "imagechat=info";

/// Largest attachment accepted by the input widget (10 MiB).
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Query parameter carrying the prompt text.
pub const PROMPT_PARAM: &str = "prompt";
/// Multipart field name for the attached image.
pub const IMAGE_FIELD: &str = "images";
/// JSON field holding the assistant's reply.
pub const RESPONSE_FIELD: &str = "response";

pub const REQUEST_FAILED_REPLY: &str = "Sorry, I encountered an error processing your request. \
Please make sure the analysis service is running and accessible.";

pub const NOTICE_RESPONSE_RECEIVED: &str = "Response received!";
pub const NOTICE_REQUEST_FAILED: &str = "Failed to get response";
pub const NOTICE_CHAT_CLEARED: &str = "Chat cleared";

/// How long a notice stays on screen.
pub const NOTICE_TTL: Duration = Duration::from_secs(4);

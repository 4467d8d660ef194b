//! Wire envelopes shared by the editor client and the hint backend.
//!
//! Everything here is plain serde data. Field names follow the JSON the
//! extension has always sent (`camelCase`), so both sides stay compatible
//! with older clients that omit optional fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol version literal both sides must agree on.
pub const API_VERSION: &str = "v2";

/// Version of this client build, sent as `extVersion`.
pub const EXT_VERSION: u32 = 5;

/// Oldest editor extension the backend still serves on `/get-help`.
pub const MIN_EXT_VERSION: u32 = 4;

/// Prompt label used by the editor "get help" command.
pub const DEFAULT_PROMPT_LABEL: &str = "Get_help";

/// Sentinel query value meaning "free-form questions are switched off".
pub const HELP_TYPE_DISABLED: &str = "<help type disabled>";

/// Author of a conversational turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of the conversation sent to the model. Order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Request body for `POST /get-help` and `POST /get-help-cli`.
///
/// Every field defaults so that a partial body still deserializes; the
/// backend rejects it afterwards on the version/key checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HelpRequest {
    /// Student identity (an email address in practice).
    #[serde(alias = "identity")]
    pub email: String,
    /// Research consent flag.
    pub consent: bool,
    /// Which system prompt to load.
    pub prompt_label: String,
    /// Homework number parsed from the file name.
    pub hw_id: String,
    /// Name of the definition the cursor is in.
    pub active_function: String,
    /// Full document text; only sent when there is no prior history.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Autograder output, if the caller has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_error: Option<String>,
    /// Free-form question typed by the student.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_query: Option<String>,
    /// Prior turns rebuilt by the client from its history store.
    pub messages: Vec<Message>,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext_version: Option<u32>,
    /// Shared secret between extension and backend.
    pub key: String,
}

/// Response body for a help request.
///
/// An empty `request_id` means the caller must not persist the turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpResponse {
    pub output: String,
    #[serde(default)]
    pub request_id: String,
}

impl HelpResponse {
    /// Failure shaped like a success so the UI flow stays uniform.
    pub fn error(cause: impl std::fmt::Display) -> Self {
        Self {
            output: format!("An error occurred: {cause}"),
            request_id: String::new(),
        }
    }
}

/// Body of rejections and server-side failures: `{ "output": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputBody {
    pub output: String,
}

impl OutputBody {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
        }
    }
}

/// Thumbs up / thumbs down on a hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Helpful,
    NotHelpful,
}

impl Feedback {
    /// Wire value: `"1"` or `"-1"`.
    pub fn as_wire(self) -> &'static str {
        match self {
            Feedback::Helpful => "1",
            Feedback::NotHelpful => "-1",
        }
    }
}

/// Request body for `POST /feedback`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub request_id: String,
    pub feedback: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext_version: Option<u32>,
    pub key: String,
}

/// `{ "status": "ok" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBody {
    pub status: String,
}

impl StatusBody {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Request body for `POST /detailed-feedback`, sent by the review web page.
///
/// Annotation fields are free-form JSON and logged as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailedFeedbackRequest {
    pub feedback: Value,
    pub comment: Value,
    pub submit_annotation: Value,
    pub hw: Value,
    pub question: Value,
    pub key: String,
}

/// One logged exchange returned by `/frontend-get-request-contents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContents {
    pub request_id: String,
    pub hw: u32,
    pub question: Option<u32>,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub bot_feedback: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn help_request_uses_camel_case_wire_names() {
        let req = HelpRequest {
            email: "a@berkeley.edu".into(),
            prompt_label: DEFAULT_PROMPT_LABEL.into(),
            hw_id: "3".into(),
            active_function: "my_func".into(),
            code: Some("def my_func(): pass".into()),
            messages: vec![Message::user("x")],
            version: API_VERSION.into(),
            ext_version: Some(EXT_VERSION),
            key: "k".into(),
            ..Default::default()
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["promptLabel"], "Get_help");
        assert_eq!(v["hwId"], "3");
        assert_eq!(v["activeFunction"], "my_func");
        assert_eq!(v["extVersion"], 5);
        assert_eq!(v["messages"][0], json!({"role": "user", "content": "x"}));
        assert!(v.get("studentQuery").is_none());
    }

    #[test]
    fn partial_help_request_still_deserializes() {
        let req: HelpRequest = serde_json::from_value(json!({"identity": "me"})).unwrap();
        assert_eq!(req.email, "me");
        assert!(req.version.is_empty());
        assert!(req.ext_version.is_none());
        assert!(req.messages.is_empty());
    }

    #[test]
    fn response_without_request_id_defaults_to_empty() {
        let resp: HelpResponse = serde_json::from_value(json!({"output": "hi"})).unwrap();
        assert_eq!(resp.request_id, "");
        assert_eq!(HelpResponse::error("boom").output, "An error occurred: boom");
    }
}

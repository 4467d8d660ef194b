//! Append-only log files under the output directory.
//!
//! Files (names pass through [`sanitize_output`]):
//! - `HW<hw>Q<q>|<prompt label>.txt`: one record per exchange,
//!   `"\n\v\n" + [id, message contents.., output].join("\n\f\n")`
//! - `FB-HW<hw>Q<q|N/A>.txt`: CSV lines `id,timestamp,feedback`
//! - `FB-ERROR.txt`: feedback whose id could not be parsed
//! - `FB-DETAIL-HW<hw>Q<q>.txt`: JSON lines from the review page
//!
//! Every record goes out in a single append so concurrent requests never
//! interleave inside a record.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use hint_protocol::{DetailedFeedbackRequest, Message, RequestContents};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::request_id::RequestId;

/// Separator written before each exchange record.
pub const RECORD_SEPARATOR: &str = "\n\u{b}\n";
/// Separator between fields of one exchange record.
pub const FIELD_SEPARATOR: &str = "\n\u{c}\n";
/// Marker the autograder puts at the top of its reports.
pub const AUTOGRADER_BANNER: &str = "The following is an automated report from an autograding tool";

/// Replace every character outside `[A-Za-z0-9|]` with `_`.
pub fn sanitize_output(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '|' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Render a loosely typed JSON field the way it reads in a file name.
fn label_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Serialize)]
struct DetailRecord<'a> {
    feedback: &'a Value,
    comment: &'a Value,
    submit_annotation: &'a Value,
    timestamp: String,
}

/// Writer/reader for the log directory.
#[derive(Debug, Clone)]
pub struct LogStore {
    dir: PathBuf,
}

impl LogStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{}.txt", sanitize_output(stem)))
    }

    /// Exchange log for `id` under `prompt_label`. An unknown question
    /// leaves the `Q` part empty.
    pub fn exchange_path(&self, id: &RequestId, prompt_label: &str) -> PathBuf {
        let q = id.question_number.map(|q| q.to_string()).unwrap_or_default();
        self.path_for(&format!("HW{}Q{}|{}", id.assignment_id, q, prompt_label))
    }

    pub fn feedback_path(&self, id: &RequestId) -> PathBuf {
        self.path_for(&format!(
            "FB-HW{}Q{}",
            id.assignment_id,
            id.question_label()
        ))
    }

    pub fn error_feedback_path(&self) -> PathBuf {
        self.path_for("FB-ERROR")
    }

    async fn append(&self, path: PathBuf, record: String) -> Result<PathBuf> {
        let out = tokio::task::spawn_blocking(move || -> std::io::Result<PathBuf> {
            let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
            file.write_all(record.as_bytes())?;
            Ok(path)
        })
        .await??;
        debug!(path = %out.display(), "log record appended");
        Ok(out)
    }

    /// Log one model exchange: the id, every message body sent, then the
    /// model output.
    pub async fn append_exchange(
        &self,
        id: &RequestId,
        prompt_label: &str,
        messages: &[Message],
        output: &str,
    ) -> Result<PathBuf> {
        let id_text = id.to_string();
        let fields: Vec<&str> = std::iter::once(id_text.as_str())
            .chain(messages.iter().map(|m| m.content.as_str()))
            .chain(std::iter::once(output))
            .collect();
        let record = format!("{RECORD_SEPARATOR}{}", fields.join(FIELD_SEPARATOR));
        self.append(self.exchange_path(id, prompt_label), record)
            .await
    }

    /// Append a `id,timestamp,feedback` line.
    ///
    /// A malformed id is still recorded, in `FB-ERROR.txt`, and then
    /// reported as [`RequestLogError::Malformed`](crate::RequestLogError::Malformed).
    pub async fn append_feedback(&self, request_id: &str, feedback: &str) -> Result<PathBuf> {
        let line = format!("{request_id},{},{feedback}\n", now_iso());
        match RequestId::parse(request_id) {
            Ok(id) => {
                let path = self.append(self.feedback_path(&id), line).await?;
                info!(hw = id.assignment_id, question = %id.question_label(), %feedback, "feedback recorded");
                Ok(path)
            }
            Err(err) => {
                warn!(%request_id, "feedback for malformed request id");
                self.append(self.error_feedback_path(), line).await?;
                Err(err.into())
            }
        }
    }

    /// Append one JSON line from the review page.
    pub async fn append_detailed_feedback(&self, req: &DetailedFeedbackRequest) -> Result<PathBuf> {
        let path = self.path_for(&format!(
            "FB-DETAIL-HW{}Q{}",
            label_value(&req.hw),
            label_value(&req.question)
        ));
        let mut line = serde_json::to_string(&DetailRecord {
            feedback: &req.feedback,
            comment: &req.comment,
            submit_annotation: &req.submit_annotation,
            timestamp: now_iso(),
        })?;
        line.push('\n');
        self.append(path, line).await
    }

    /// Look up the logged exchange for `request_id`.
    ///
    /// Returns the last three fields of the record as code, autograder
    /// error and bot output. When the middle field is not an autograder
    /// report there was no error, and that field is the code. A missing
    /// log file or record yields `None`.
    pub async fn find_request(
        &self,
        request_id: &str,
        prompt_label: &str,
    ) -> Result<Option<RequestContents>> {
        let id = RequestId::parse(request_id)?;
        let path = self.exchange_path(&id, prompt_label);
        let log = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no exchange log for request");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let Some(record) = log
            .split(RECORD_SEPARATOR)
            .find(|r| r.starts_with(request_id))
        else {
            return Ok(None);
        };

        let fields: Vec<&str> = record.split(FIELD_SEPARATOR).skip(1).collect();
        let [code, error, bot_feedback] = match fields.as_slice() {
            [.., a, b, c] => [*a, *b, *c],
            _ => {
                warn!(%request_id, fields = fields.len(), "exchange record too short");
                return Ok(None);
            }
        };
        let (code, error) = if error.contains(AUTOGRADER_BANNER) {
            (code, Some(error.to_string()))
        } else {
            (error, None)
        };

        Ok(Some(RequestContents {
            request_id: request_id.to_string(),
            hw: id.assignment_id,
            question: id.question_number,
            code: code.to_string(),
            error,
            bot_feedback: bot_feedback.to_string(),
        }))
    }
}

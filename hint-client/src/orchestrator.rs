//! The "get help" command, end to end.
//!
//! Order of effects per call:
//! 1. locate the definition at the cursor (nothing open: stop quietly)
//! 2. read the homework number from the file name (none: show an error)
//! 3. load history for the definition, keep the most recent turns
//! 4. raise the in-progress flag, call the backend, lower the flag
//! 5. append a history entry when the backend issued a request id
//! 6. show the hint and send the feedback choice

use std::sync::OnceLock;

use context_window::{HISTORY_WINDOW, HistoryEntry, prior_messages};
use function_locator::{EditorContext, Locator};
use hint_protocol::{Feedback, HelpResponse};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::{
    errors::{ClientError, Result},
    history::history_key,
    http_client::HelpCall,
    session::SessionContext,
};

pub const PROGRESS_TITLE: &str = "Getting help...";

fn hw_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"hw(\d+)").expect("valid homework pattern"))
}

/// Homework number from a file name such as `.../hw03.py`.
pub fn homework_id(file_name: &str) -> Option<String> {
    hw_pattern()
        .captures(file_name)
        .map(|c| c[1].to_string())
}

/// What the student saw and answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpOutcome {
    pub response: HelpResponse,
    pub feedback: Feedback,
}

#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    locator: Locator,
}

impl Orchestrator {
    pub fn new(locator: Locator) -> Self {
        Self { locator }
    }

    pub async fn get_help(
        &self,
        session: &SessionContext,
        editor: &dyn EditorContext,
        student_query: Option<String>,
    ) -> Result<HelpOutcome> {
        let Some((active, unit)) = self.locator.locate_active(editor).await else {
            debug!("get help without an open editor");
            return Err(ClientError::NoActiveContext);
        };

        let Some(hw_id) = homework_id(&active.file_name) else {
            let err = ClientError::UnresolvableUnit {
                file_name: active.file_name.clone(),
            };
            session.errors.show(&err.to_string());
            return Err(err);
        };

        let key = history_key(&unit.name);
        let history = session.history.load(&key).await.unwrap_or_else(|e| {
            warn!(error = %e, %key, "history unavailable; asking without it");
            Vec::new()
        });

        let document = active.document.text().to_string();
        let call = HelpCall {
            identity: session.identity.clone(),
            consent: session.consent,
            hw_id,
            active_function: unit.name.clone(),
            code: history.is_empty().then(|| document.clone()),
            student_query,
            messages: prior_messages(&history, HISTORY_WINDOW, &document),
        };
        info!(
            function = %unit.name,
            hw = %call.hw_id,
            history = history.len(),
            "requesting help"
        );

        session.in_progress.set(true);
        session.progress.start(PROGRESS_TITLE);

        let response = session.client.request_help(&call).await;
        session.progress.finish();
        session.in_progress.set(false);

        if !response.request_id.is_empty() {
            let entry = HistoryEntry::new(
                document,
                response.output.clone(),
                response.request_id.clone(),
            );
            if let Err(e) = session.history.append(&key, entry).await {
                warn!(error = %e, %key, "history append failed");
            }
        }

        let feedback = match session.feedback.ask(&response.output).await {
            Some(Feedback::Helpful) => Feedback::Helpful,
            _ => Feedback::NotHelpful,
        };
        session
            .client
            .submit_feedback(&response.request_id, feedback)
            .await;

        Ok(HelpOutcome { response, feedback })
    }
}

//! Editor-side half of the hint bot.
//!
//! [`Orchestrator::get_help`] runs the whole command against a
//! [`SessionContext`]: locate the definition at the cursor, replay recent
//! history, call the backend through [`HelpClient`] with a timeout, record
//! the turn and pass the student's thumbs up / down back.

pub mod errors;
pub mod history;
pub mod http_client;
pub mod orchestrator;
pub mod session;

pub use errors::{ClientError, Result};
pub use history::{
    HISTORY_NAMESPACE, HistoryStore, JsonFileHistoryStore, MemoryHistoryStore, history_key,
};
pub use http_client::{
    ClientConfig, DEFAULT_SERVER, DEFAULT_TIMEOUT, HelpCall, HelpClient, HelpRoute, race,
};
pub use orchestrator::{HelpOutcome, Orchestrator, PROGRESS_TITLE, homework_id};
pub use session::{ErrorNotice, FeedbackPrompt, InProgressFlag, ProgressIndicator, SessionContext};

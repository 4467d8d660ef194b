//! Request-scoped context for the help flow, plus the editor UI seams.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use hint_protocol::Feedback;

use crate::history::HistoryStore;
use crate::http_client::HelpClient;

/// Progress notification shown while the backend works.
pub trait ProgressIndicator: Send + Sync {
    fn start(&self, title: &str);
    fn finish(&self);
}

/// Shows the hint and asks whether it helped. `None` means dismissed.
#[async_trait]
pub trait FeedbackPrompt: Send + Sync {
    async fn ask(&self, output: &str) -> Option<Feedback>;
}

/// Shows a user-facing error with a dismiss action.
pub trait ErrorNotice: Send + Sync {
    fn show(&self, message: &str);
}

/// "Getting help" flag the editor binds its UI state to.
#[derive(Debug, Clone, Default)]
pub struct InProgressFlag(Arc<AtomicBool>);

impl InProgressFlag {
    pub fn set(&self, value: bool) {
        self.0.store(value, Ordering::SeqCst);
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything one help request needs, passed in rather than read from
/// globals.
pub struct SessionContext {
    /// Student identity sent as `email`.
    pub identity: String,
    pub consent: bool,
    pub in_progress: InProgressFlag,
    pub history: Arc<dyn HistoryStore>,
    pub client: HelpClient,
    pub progress: Arc<dyn ProgressIndicator>,
    pub feedback: Arc<dyn FeedbackPrompt>,
    pub errors: Arc<dyn ErrorNotice>,
}

//! Context assembly for hint requests.
//!
//! Turns a system prompt, the course question, the student's code and the
//! recent help history into a token-budgeted message list:
//! - [`assets`]: prompt and note files on disk;
//! - [`course`]: homework question lookup by function name;
//! - [`history`]: past turns and their replay order;
//! - [`builder`]: message layout and trimming;
//! - [`tokens`]: token counting.

pub mod assets;
pub mod builder;
pub mod course;
pub mod error;
pub mod history;
pub mod tokens;

pub use assets::{NOTE_PLACEHOLDER, PromptLibrary, sanitize_label};
pub use builder::{
    BuiltConversation, ContextWindowBuilder, ConversationInput, DEFAULT_TOKEN_BUDGET,
    MIN_KEPT_MESSAGES, wrap_student_query,
};
pub use course::{CourseCatalog, CourseSection, FunctionTarget, ResolvedQuestion, UNKNOWN_COURSE};
pub use error::ContextError;
pub use history::{HISTORY_WINDOW, HistoryEntry, prior_messages, recent, split_prior_messages};
pub use tokens::{TiktokenCounter, TokenCount};

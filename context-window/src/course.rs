//! Course question catalog: which homework question a function belongs to.
//!
//! Two JSON files per term:
//! - `scrapes/{term}.json`: array of sections `{hw, course, type, number?, title, text}`
//!   scraped from the course site (`type` is `"question"` or `"preface"`);
//! - `active-function-maps/{term}.json`: `{"hw3": {"my_func": 2, "other": ["61a", 4]}}`
//!   mapping a function name to a question number, optionally qualified by course.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ContextError;

/// Course label used when the function map does not name one.
pub const UNKNOWN_COURSE: &str = "unknown";

/// One scraped section of a homework page.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseSection {
    pub hw: u32,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub number: Option<u32>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
}

impl CourseSection {
    fn is_question(&self) -> bool {
        self.kind == "question"
    }
}

/// Function-map value: bare question number or `[course, number]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FunctionTarget {
    Number(u32),
    Qualified(String, u32),
}

/// Question resolved for one help request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedQuestion {
    /// Question statement; empty when the function is not mapped.
    pub text: String,
    pub number: Option<u32>,
    pub course: String,
}

/// In-memory question catalog for one term.
#[derive(Debug, Clone, Default)]
pub struct CourseCatalog {
    by_hw: HashMap<u32, Vec<CourseSection>>,
    /// `"hw<N>" -> function -> target`
    function_map: HashMap<String, HashMap<String, FunctionTarget>>,
}

impl CourseCatalog {
    pub fn new(
        sections: Vec<CourseSection>,
        function_map: HashMap<String, HashMap<String, FunctionTarget>>,
    ) -> Self {
        let mut by_hw: HashMap<u32, Vec<CourseSection>> = HashMap::new();
        for s in sections {
            by_hw.entry(s.hw).or_default().push(s);
        }
        Self {
            by_hw,
            function_map,
        }
    }

    /// Load `scrapes/{term}.json` and `active-function-maps/{term}.json`
    /// under `course_dir`.
    pub async fn load(course_dir: &Path, term: &str) -> Result<Self, ContextError> {
        let scrape_path = course_dir.join("scrapes").join(format!("{term}.json"));
        let map_path = course_dir
            .join("active-function-maps")
            .join(format!("{term}.json"));

        let sections: Vec<CourseSection> =
            serde_json::from_str(&tokio::fs::read_to_string(&scrape_path).await?)?;
        let function_map = serde_json::from_str(&tokio::fs::read_to_string(&map_path).await?)?;

        let catalog = Self::new(sections, function_map);
        info!(
            term,
            homeworks = catalog.by_hw.len(),
            "course catalog loaded"
        );
        Ok(catalog)
    }

    /// Find the question for `function` in homework `hw_id`.
    ///
    /// A numeric mapping matches by number alone and leaves the course
    /// unknown; a `[course, number]` mapping must match both. Unmapped
    /// functions resolve to an empty question.
    ///
    /// # Errors
    /// [`ContextError::UnknownHomework`] when `hw_id` is not a number or the
    /// catalog has no sections for it.
    pub fn resolve(&self, hw_id: &str, function: &str) -> Result<ResolvedQuestion, ContextError> {
        let hw: u32 = hw_id
            .trim()
            .parse()
            .map_err(|_| ContextError::UnknownHomework(hw_id.to_string()))?;
        let sections = self
            .by_hw
            .get(&hw)
            .ok_or_else(|| ContextError::UnknownHomework(hw_id.to_string()))?;

        let target = self
            .function_map
            .get(&format!("hw{hw_id}"))
            .and_then(|m| m.get(function));

        let (course, found) = match target {
            Some(FunctionTarget::Number(n)) => (
                UNKNOWN_COURSE.to_string(),
                sections
                    .iter()
                    .find(|s| s.is_question() && s.number == Some(*n)),
            ),
            Some(FunctionTarget::Qualified(course, n)) => (
                course.clone(),
                sections.iter().find(|s| {
                    s.is_question()
                        && s.course.as_deref() == Some(course.as_str())
                        && s.number == Some(*n)
                }),
            ),
            None => (UNKNOWN_COURSE.to_string(), None),
        };
        debug!(hw, function, ?target, found = found.is_some(), "question lookup");

        Ok(ResolvedQuestion {
            text: found.map(|s| s.text.clone()).unwrap_or_default(),
            number: found.and_then(|s| s.number),
            course,
        })
    }
}

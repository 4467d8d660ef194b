//! Human-readable request identifiers.
//!
//! Shape: `HW<hw> Q<question?> (<identity>) @ <timestamp> from <function> (<course>)`.
//! The identifier travels to the client with the hint and comes back with
//! feedback, so it must parse back into the same fields.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, TimeZone};
use regex::Regex;

use crate::errors::MalformedIdentifier;

/// Suffix appended to the identity when the student consented to research use.
pub const CONSENT_SUFFIX: &str = "--RC";

/// Label used in file names when the question number is unknown.
pub const UNKNOWN_QUESTION: &str = "N/A";

const TIMESTAMP_FORMAT: &str = "%a %b %d %Y %H:%M:%S GMT%z";

fn pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // The definition name is empty when no definition encloses the cursor.
        Regex::new(r"^HW(\d+) Q(\d+)? \((.+)\) @ (.+) from (.*) \((.+)\)$")
            .expect("request id pattern is valid")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId {
    pub assignment_id: u32,
    pub question_number: Option<u32>,
    /// Student identity, with [`CONSENT_SUFFIX`] when consent was given.
    pub identity: String,
    pub timestamp: String,
    pub definition_name: String,
    pub course: String,
}

impl RequestId {
    /// New identifier stamped with the current local time.
    pub fn issue(
        assignment_id: u32,
        question_number: Option<u32>,
        email: &str,
        consent: bool,
        definition_name: &str,
        course: &str,
    ) -> Self {
        Self::issue_at(
            &chrono::Local::now(),
            assignment_id,
            question_number,
            email,
            consent,
            definition_name,
            course,
        )
    }

    pub fn issue_at<Tz>(
        at: &DateTime<Tz>,
        assignment_id: u32,
        question_number: Option<u32>,
        email: &str,
        consent: bool,
        definition_name: &str,
        course: &str,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let identity = if consent {
            format!("{email}{CONSENT_SUFFIX}")
        } else {
            email.to_string()
        };
        Self {
            assignment_id,
            question_number,
            identity,
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
            definition_name: definition_name.to_string(),
            course: course.to_string(),
        }
    }

    /// Parse a rendered identifier.
    pub fn parse(s: &str) -> Result<Self, MalformedIdentifier> {
        let malformed = || MalformedIdentifier(s.to_string());
        let caps = pattern().captures(s).ok_or_else(malformed)?;

        let assignment_id = caps[1].parse().map_err(|_| malformed())?;
        let question_number = match caps.get(2) {
            Some(m) => Some(m.as_str().parse().map_err(|_| malformed())?),
            None => None,
        };

        Ok(Self {
            assignment_id,
            question_number,
            identity: caps[3].to_string(),
            timestamp: caps[4].to_string(),
            definition_name: caps[5].to_string(),
            course: caps[6].to_string(),
        })
    }

    pub fn consented(&self) -> bool {
        self.identity.ends_with(CONSENT_SUFFIX)
    }

    /// Question number, or `N/A` when unknown.
    pub fn question_label(&self) -> String {
        self.question_number
            .map(|q| q.to_string())
            .unwrap_or_else(|| UNKNOWN_QUESTION.to_string())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HW{} Q", self.assignment_id)?;
        if let Some(q) = self.question_number {
            write!(f, "{q}")?;
        }
        write!(
            f,
            " ({}) @ {} from {} ({})",
            self.identity, self.timestamp, self.definition_name, self.course
        )
    }
}

impl FromStr for RequestId {
    type Err = MalformedIdentifier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

//! Status code classification
//!
//! Maps a response status to a coarse category and decides whether it counts
//! as a find under the configured [`StatusFilter`].

use std::collections::BTreeSet;
use std::fmt;

/// Coarse category of an HTTP status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatusCategory {
    /// 2xx
    Success,
    /// 3xx
    Redirect,
    /// 4xx
    ClientError,
    /// 5xx and anything outside the ranges above
    ServerError,
}

impl StatusCategory {
    /// Categorizes a status code; total over every `u16`
    pub fn of(status_code: u16) -> Self {
        match status_code {
            200..=299 => Self::Success,
            300..=399 => Self::Redirect,
            400..=499 => Self::ClientError,
            _ => Self::ServerError,
        }
    }

    /// Short lowercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Redirect => "redirect",
            Self::ClientError => "client_error",
            Self::ServerError => "server_error",
        }
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of status codes that count as a find
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFilter {
    codes: BTreeSet<u16>,
}

impl StatusFilter {
    pub fn new(codes: impl IntoIterator<Item = u16>) -> Self {
        Self {
            codes: codes.into_iter().collect(),
        }
    }

    pub fn contains(&self, status_code: u16) -> bool {
        self.codes.contains(&status_code)
    }

    pub fn codes(&self) -> impl Iterator<Item = u16> + '_ {
        self.codes.iter().copied()
    }
}

impl Default for StatusFilter {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_STATUS_FILTER)
    }
}

/// Result of classifying one status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: StatusCategory,
    pub is_match: bool,
}

/// Classifies a status code against a filter
///
/// # Example
///
/// ```
/// use subseek::{classify, StatusCategory, StatusFilter};
///
/// let filter = StatusFilter::default();
/// let result = classify(404, &filter);
/// assert_eq!(result.category, StatusCategory::ClientError);
/// assert!(!result.is_match);
/// ```
pub fn classify(status_code: u16, filter: &StatusFilter) -> Classification {
    Classification {
        category: StatusCategory::of(status_code),
        is_match: filter.contains(status_code),
    }
}

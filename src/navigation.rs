// src/navigation.rs
use std::fmt;

/// Destinations reached after a successful action. Arriving at a page means
/// starting over from whatever is in local storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    AnalysisResults,
    CoverLetterResults,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Page::AnalysisResults => write!(f, "resume-result"),
            Page::CoverLetterResults => write!(f, "cover-letter-results"),
        }
    }
}

/// Performs the page transition. In-memory session state is gone once this
/// is called, so anything that must survive has to be persisted first.
pub trait Navigator: Send + Sync {
    fn navigate(&self, page: Page);
}

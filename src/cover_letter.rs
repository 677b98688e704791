// src/cover_letter.rs
//! Cover letter generator page and its results page.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{error, info, warn};

use crate::core::{CareerBackend, LocalStore};
use crate::error::SessionError;
use crate::navigation::{Navigator, Page};
use crate::types::CoverLetterRequest;

pub const MISSING_FIELDS_MESSAGE: &str =
    "Please fill in all required fields (Name, Email, Company, Job Title, Job Description).";
pub const NO_LETTER_MESSAGE: &str = "No cover letter found. Please go back and generate one.";

/// Trim every field and check the required ones.
pub fn prepare_request(form: &CoverLetterRequest) -> Result<CoverLetterRequest, SessionError> {
    let request = CoverLetterRequest {
        full_name: form.full_name.trim().to_string(),
        email: form.email.trim().to_string(),
        phone: form.phone.trim().to_string(),
        company_name: form.company_name.trim().to_string(),
        job_title: form.job_title.trim().to_string(),
        hiring_manager: form.hiring_manager.trim().to_string(),
        job_description: form.job_description.trim().to_string(),
    };

    let required = [
        &request.full_name,
        &request.email,
        &request.company_name,
        &request.job_title,
        &request.job_description,
    ];
    if required.iter().any(|field| field.is_empty()) {
        return Err(SessionError::Validation(MISSING_FIELDS_MESSAGE.to_string()));
    }

    Ok(request)
}

/// Generate, persist as `generatedCoverLetter`, then navigate to the results
/// page. Returns the letter.
pub async fn generate(
    form: &CoverLetterRequest,
    backend: &dyn CareerBackend,
    store: &LocalStore,
    navigator: &dyn Navigator,
) -> Result<String, SessionError> {
    let request = prepare_request(form).inspect_err(|err| warn!("{}", err))?;

    let letter = match backend.generate_cover_letter(&request).await {
        Ok(response) => response.cover_letter.filter(|l| !l.trim().is_empty()),
        Err(err) => {
            let err = SessionError::transport(err);
            error!("[{}] Failed to generate cover letter: {}", err.code(), err);
            return Err(err);
        }
    };

    let Some(letter) = letter else {
        let err = SessionError::Transport("No cover letter returned".to_string());
        error!("[{}] {}", err.code(), err);
        return Err(err);
    };

    store
        .set_cover_letter(&letter)
        .map_err(SessionError::transport)?;
    info!("Cover letter saved, navigating to {}", Page::CoverLetterResults);
    navigator.navigate(Page::CoverLetterResults);

    Ok(letter)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverLetterPage {
    Missing,
    Letter(String),
}

impl CoverLetterPage {
    pub fn load(store: &LocalStore) -> Self {
        match store.cover_letter() {
            Ok(Some(letter)) => CoverLetterPage::Letter(letter),
            Ok(None) => CoverLetterPage::Missing,
            Err(err) => {
                warn!("Unreadable cover letter record: {:#}", err);
                CoverLetterPage::Missing
            }
        }
    }

    /// Text shown on the page.
    pub fn body(&self) -> &str {
        match self {
            CoverLetterPage::Letter(letter) => letter,
            CoverLetterPage::Missing => NO_LETTER_MESSAGE,
        }
    }

    /// Write the letter to `path`. Fails when there is no letter.
    pub fn export(&self, path: &Path) -> Result<()> {
        let CoverLetterPage::Letter(letter) = self else {
            anyhow::bail!("No cover letter to export");
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(path, letter)
            .with_context(|| format!("Failed to write file: {}", path.display()))?;
        info!("Cover letter exported to {}", path.display());
        Ok(())
    }
}

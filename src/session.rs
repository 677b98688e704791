// src/session.rs
//! Analysis session controller: optional resume upload, analysis, local
//! persistence, then navigation to the results page.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::core::{CareerBackend, LocalStore};
use crate::error::SessionError;
use crate::navigation::{Navigator, Page};
use crate::progress::{ProgressReporter, ProgressSink};
use crate::types::{AnalysisContext, AnalysisResult};
use crate::upload::{SelectedFile, UploadCollector, UploadedFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResumeSource {
    #[default]
    Upload,
    Paste,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Validating,
    Uploading,
    Analyzing,
    Succeeded,
    Failed,
}

/// Form edits, the only way session input changes.
#[derive(Debug, Clone)]
pub enum FormEvent {
    SetResumeSource(ResumeSource),
    SetJobDescription(String),
    SetPastedResume(String),
    AddFiles(Vec<SelectedFile>),
    RemoveFile(Uuid),
    ClearFiles,
}

/// User-entered values. Survive a failed run untouched.
#[derive(Debug, Clone, Default)]
pub struct SessionForm {
    pub source: ResumeSource,
    pub job_description: String,
    pub pasted_resume: String,
    pub files: UploadCollector,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// A run was already in flight, or the session already finished.
    Ignored,
    Navigated { page: Page, result: AnalysisResult },
}

/// Validated input for one run.
#[derive(Debug)]
struct AnalysisPlan {
    resume: PlannedResume,
    job_description: String,
}

#[derive(Debug)]
enum PlannedResume {
    Upload(UploadedFile),
    Pasted(String),
}

pub struct AnalysisSession {
    form: SessionForm,
    phase: SessionPhase,
    last_error: Option<SessionError>,
    progress_sink: Arc<dyn ProgressSink>,
}

impl AnalysisSession {
    pub fn new(progress_sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            form: SessionForm::default(),
            phase: SessionPhase::Idle,
            last_error: None,
            progress_sink,
        }
    }

    pub fn handle(&mut self, event: FormEvent) {
        match event {
            FormEvent::SetResumeSource(source) => self.form.source = source,
            FormEvent::SetJobDescription(text) => self.form.job_description = text,
            FormEvent::SetPastedResume(text) => self.form.pasted_resume = text,
            FormEvent::AddFiles(files) => {
                self.form.files.add(files);
            }
            FormEvent::RemoveFile(id) => {
                self.form.files.remove(id);
            }
            FormEvent::ClearFiles => self.form.files.clear(),
        }
    }

    /// Stat `paths` on disk and add them to the upload list.
    pub fn add_paths(&mut self, paths: &[PathBuf]) -> anyhow::Result<Vec<Uuid>> {
        self.form.files.add_paths(paths)
    }

    pub fn form(&self) -> &SessionForm {
        &self.form
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    /// Back to `Idle` after a finished run, keeping the form.
    pub fn reset(&mut self) {
        self.phase = SessionPhase::Idle;
        self.last_error = None;
    }

    /// Guard and validate. `Ok(None)` means the trigger was ignored because
    /// the session is not idle; a validation error leaves it idle.
    fn begin(&mut self) -> Result<Option<AnalysisPlan>, SessionError> {
        if self.phase != SessionPhase::Idle {
            debug!("Ignoring analysis trigger while {:?}", self.phase);
            return Ok(None);
        }

        self.phase = SessionPhase::Validating;
        match self.validate() {
            Ok(plan) => {
                self.phase = match plan.resume {
                    PlannedResume::Upload(_) => SessionPhase::Uploading,
                    PlannedResume::Pasted(_) => SessionPhase::Analyzing,
                };
                self.last_error = None;
                Ok(Some(plan))
            }
            Err(err) => {
                warn!("Analysis input rejected: {}", err);
                self.phase = SessionPhase::Idle;
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn validate(&self) -> Result<AnalysisPlan, SessionError> {
        if self.form.job_description.trim().is_empty() {
            return Err(SessionError::Validation(
                "Please enter a job description.".to_string(),
            ));
        }

        let resume = match self.form.source {
            ResumeSource::Paste => {
                if self.form.pasted_resume.trim().is_empty() {
                    return Err(SessionError::Validation(
                        "Please paste your resume text.".to_string(),
                    ));
                }
                PlannedResume::Pasted(self.form.pasted_resume.clone())
            }
            ResumeSource::Upload => match self.form.files.first() {
                Some(file) => PlannedResume::Upload(file.clone()),
                None => {
                    return Err(SessionError::Validation(
                        "Please upload a resume.".to_string(),
                    ))
                }
            },
        };

        Ok(AnalysisPlan {
            resume,
            job_description: self.form.job_description.clone(),
        })
    }

    /// Run one analysis session end to end. Results are persisted before
    /// `navigator` is invoked.
    pub async fn submit(
        &mut self,
        backend: &dyn CareerBackend,
        store: &LocalStore,
        navigator: &dyn Navigator,
    ) -> Result<SubmitOutcome, SessionError> {
        let Some(plan) = self.begin()? else {
            return Ok(SubmitOutcome::Ignored);
        };

        let progress = ProgressReporter::start(Arc::clone(&self.progress_sink));

        match self.execute(plan, backend, store).await {
            Ok(result) => {
                progress.complete_success();
                self.phase = SessionPhase::Succeeded;
                info!("Analysis complete, navigating to {}", Page::AnalysisResults);
                navigator.navigate(Page::AnalysisResults);
                Ok(SubmitOutcome::Navigated {
                    page: Page::AnalysisResults,
                    result,
                })
            }
            Err(err) => {
                progress.complete_failure();
                self.phase = SessionPhase::Failed;
                error!("[{}] {}", err.code(), err);
                self.last_error = Some(err.clone());
                self.phase = SessionPhase::Idle;
                Err(err)
            }
        }
    }

    async fn execute(
        &mut self,
        plan: AnalysisPlan,
        backend: &dyn CareerBackend,
        store: &LocalStore,
    ) -> Result<AnalysisResult, SessionError> {
        let resume_text = match plan.resume {
            PlannedResume::Upload(file) => {
                info!("Uploading resume {}", file.name);
                let text = backend
                    .upload_resume(&file)
                    .await
                    .map_err(SessionError::upload)?;
                if text.trim().is_empty() {
                    return Err(SessionError::UploadFailed(
                        "no text could be extracted from the resume".to_string(),
                    ));
                }
                self.phase = SessionPhase::Analyzing;
                text
            }
            PlannedResume::Pasted(text) => text,
        };

        let context = AnalysisContext::new(resume_text, plan.job_description);
        let result = backend
            .analyze(&context)
            .await
            .map_err(SessionError::analysis)?;

        store
            .persist_analysis(&result, &context)
            .map_err(SessionError::analysis)?;
        debug!("Analysis results and context persisted");

        Ok(result)
    }
}

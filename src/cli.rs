// src/cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::chat::{ChatAssistant, ChatMessage, ChatSink, GREETING};
use crate::core::{CareerBackend, LocalStore};
use crate::cover_letter::{self, CoverLetterPage};
use crate::navigation::{Navigator, Page};
use crate::progress::{ProgressSink, ProgressStep, StepState};
use crate::results::ResultsPage;
use crate::session::{AnalysisSession, FormEvent, ResumeSource, SubmitOutcome};
use crate::types::CoverLetterRequest;
use crate::upload::format_file_size;

#[derive(Parser)]
#[command(name = "career-compass")]
#[command(about = "Analyze resumes against job descriptions and get career advice")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, default_value = "config.yaml")]
    pub config: PathBuf,
}

#[derive(Subcommand)]
pub enum Command {
    /// Analyze a resume against a job description
    Analyze {
        #[arg(long, conflicts_with = "job_description_file")]
        job_description: Option<String>,
        #[arg(long)]
        job_description_file: Option<PathBuf>,
        /// Resume file to upload; only the first one is analyzed
        #[arg(long = "resume")]
        resumes: Vec<PathBuf>,
        /// Paste resume text instead of uploading a file
        #[arg(long, conflicts_with_all = ["resumes", "resume_text_file"])]
        resume_text: Option<String>,
        #[arg(long, conflicts_with = "resumes")]
        resume_text_file: Option<PathBuf>,
    },
    /// Show the last analysis results
    Results,
    /// Ask the career assistant a single question
    Ask { question: String },
    /// Interactive chat with the career assistant
    Chat,
    /// Generate or show a cover letter
    CoverLetter {
        #[command(subcommand)]
        command: CoverLetterCommand,
    },
    /// Remove every persisted record
    Clear,
}

#[derive(Subcommand)]
pub enum CoverLetterCommand {
    /// Generate a cover letter
    Generate {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long)]
        company: String,
        #[arg(long)]
        job_title: String,
        #[arg(long, default_value = "")]
        hiring_manager: String,
        #[arg(long, conflicts_with = "job_description_file")]
        job_description: Option<String>,
        #[arg(long)]
        job_description_file: Option<PathBuf>,
    },
    /// Show the last generated cover letter
    Show {
        /// Also write the letter to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Renders the destination page as soon as it is reached.
struct ConsoleNavigator<'a> {
    store: &'a LocalStore,
}

impl Navigator for ConsoleNavigator<'_> {
    fn navigate(&self, page: Page) {
        info!("Navigating to {}", page);
        match page {
            Page::AnalysisResults => print!("{}", ResultsPage::load(self.store)),
            Page::CoverLetterResults => println!("{}", CoverLetterPage::load(self.store).body()),
        }
    }
}

struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn on_step(&self, step: ProgressStep, state: StepState) {
        let marker = match state {
            StepState::Pending => " ",
            StepState::Active => "…",
            StepState::Done => "✓",
        };
        eprintln!("[{}] {}", marker, step.label());
    }

    fn on_visibility(&self, visible: bool) {
        if visible {
            eprintln!("Analyzing...");
        }
    }
}

/// Prints assistant replies as they land, with a placeholder while waiting.
struct ConsoleChat;

impl ChatSink for ConsoleChat {
    fn on_loading(&self, loading: bool) {
        if loading {
            eprintln!("…");
        }
    }

    fn on_message(&self, message: &ChatMessage) {
        if !message.is_user {
            println!("{}\n", message.text);
        }
    }
}

async fn read_text_arg(inline: Option<String>, file: Option<&Path>) -> Result<String> {
    match (inline, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display())),
        (None, None) => Ok(String::new()),
    }
}

pub async fn handle_command(
    command: Command,
    backend: &dyn CareerBackend,
    store: &LocalStore,
) -> Result<()> {
    let navigator = ConsoleNavigator { store };

    match command {
        Command::Analyze {
            job_description,
            job_description_file,
            resumes,
            resume_text,
            resume_text_file,
        } => {
            let mut session = AnalysisSession::new(Arc::new(ConsoleProgress));
            let job_description =
                read_text_arg(job_description, job_description_file.as_deref()).await?;
            session.handle(FormEvent::SetJobDescription(job_description));

            if resume_text.is_some() || resume_text_file.is_some() {
                let pasted = read_text_arg(resume_text, resume_text_file.as_deref()).await?;
                session.handle(FormEvent::SetResumeSource(ResumeSource::Paste));
                session.handle(FormEvent::SetPastedResume(pasted));
            } else {
                session.handle(FormEvent::SetResumeSource(ResumeSource::Upload));
                session.add_paths(&resumes)?;

                let stats = session.form().files.stats();
                if stats.count > 0 {
                    eprintln!(
                        "{} file(s) selected, {}",
                        stats.count,
                        format_file_size(stats.total_size)
                    );
                }
            }

            match session.submit(backend, store, &navigator).await {
                Ok(SubmitOutcome::Navigated { .. }) | Ok(SubmitOutcome::Ignored) => Ok(()),
                Err(err) => anyhow::bail!("{}", err.user_message()),
            }
        }

        Command::Results => {
            print!("{}", ResultsPage::load(store));
            Ok(())
        }

        Command::Ask { question } => {
            let mut chat = ChatAssistant::new(Arc::new(ConsoleChat));
            chat.send_message(&question, backend, store).await;
            Ok(())
        }

        Command::Chat => run_chat(backend, store).await,

        Command::CoverLetter { command } => match command {
            CoverLetterCommand::Generate {
                full_name,
                email,
                phone,
                company,
                job_title,
                hiring_manager,
                job_description,
                job_description_file,
            } => {
                let form = CoverLetterRequest {
                    full_name,
                    email,
                    phone,
                    company_name: company,
                    job_title,
                    hiring_manager,
                    job_description: read_text_arg(
                        job_description,
                        job_description_file.as_deref(),
                    )
                    .await?,
                };
                cover_letter::generate(&form, backend, store, &navigator)
                    .await
                    .map(|_| ())
                    .map_err(|err| anyhow::anyhow!("{}", err.user_message()))
            }
            CoverLetterCommand::Show { output } => {
                let page = CoverLetterPage::load(store);
                println!("{}", page.body());
                if let Some(path) = output {
                    page.export(&path)?;
                    eprintln!("Saved to {}", path.display());
                }
                Ok(())
            }
        },

        Command::Clear => {
            store.clear_all()?;
            println!("Cleared saved analysis, context and cover letter.");
            Ok(())
        }
    }
}

async fn run_chat(backend: &dyn CareerBackend, store: &LocalStore) -> Result<()> {
    let mut chat = ChatAssistant::new(Arc::new(ConsoleChat));
    chat.toggle();

    println!("{}", GREETING);
    println!("Type /help for common questions, /quit to leave.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let text = line.trim();
        match text {
            "/quit" | "/exit" => break,
            "/help" if chat.suggestions_visible() => {
                println!("Common questions (enter the number to ask):");
                for (index, question) in chat.suggested_questions().enumerate() {
                    println!("  {}. {}", index + 1, question);
                }
            }
            "/help" => println!("Ask anything about your resume or the job description."),
            _ => match text.parse::<usize>() {
                Ok(number) if number > 0 && chat.suggestions_visible() => {
                    chat.ask_suggested(number - 1, backend, store).await;
                }
                _ => {
                    chat.send_message(text, backend, store).await;
                }
            },
        }
    }

    chat.toggle();
    Ok(())
}

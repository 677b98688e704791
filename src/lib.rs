//! Career Compass: resume analysis, career chat and cover letter client.

pub mod chat;
pub mod cli;
pub mod core;
pub mod cover_letter;
pub mod environment;
pub mod error;
pub mod navigation;
pub mod progress;
pub mod results;
pub mod session;
pub mod types;
pub mod upload;

pub use crate::core::{CareerBackend, LocalStore, ServiceClient};
pub use crate::environment::EnvironmentConfig;
pub use crate::error::SessionError;
pub use crate::navigation::{Navigator, Page};
pub use crate::session::AnalysisSession;

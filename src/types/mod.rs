// src/types/mod.rs
pub mod analysis;
pub mod response;

pub use analysis::{AnalysisContext, AnalysisResult};
pub use response::{
    AskRequest, AskResponse, CoverLetterRequest, CoverLetterResponse, UploadResponse,
};

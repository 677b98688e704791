// src/types/response.rs
use serde::{Deserialize, Serialize};

// ===== Service Request Types =====

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    pub question: String,
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub company_name: String,
    pub job_title: String,
    pub hiring_manager: String,
    pub job_description: String,
}

// ===== Service Response Types =====

/// `/api/upload-resume` reply: the text extracted from the uploaded file.
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct AskResponse {
    #[serde(default)]
    pub answer: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterResponse {
    pub cover_letter: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_letter_request_wire_names() {
        let request = CoverLetterRequest {
            full_name: "Ada Lovelace".to_string(),
            hiring_manager: String::new(),
            ..Default::default()
        };
        let value = serde_json::to_value(&request).unwrap();

        for key in [
            "fullName",
            "email",
            "phone",
            "companyName",
            "jobTitle",
            "hiringManager",
            "jobDescription",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["fullName"], "Ada Lovelace");
    }

    #[test]
    fn test_ask_request_wire_names() {
        let request = AskRequest {
            question: "Am I a fit?".to_string(),
            resume_text: "Rust engineer".to_string(),
            job_description: "Backend role".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "question": "Am I a fit?",
                "resumeText": "Rust engineer",
                "jobDescription": "Backend role"
            })
        );
    }

    #[test]
    fn test_upload_and_ask_replies_parse() {
        let upload: UploadResponse = serde_json::from_str(r#"{"text": "Extracted"}"#).unwrap();
        assert_eq!(upload.text, "Extracted");

        let answer: AskResponse = serde_json::from_str(r#"{"answer": "Yes"}"#).unwrap();
        assert_eq!(answer.answer, "Yes");
    }

    #[test]
    fn test_cover_letter_response_tolerates_missing_letter() {
        let response: CoverLetterResponse = serde_json::from_str("{}").unwrap();
        assert!(response.cover_letter.is_none());
    }
}

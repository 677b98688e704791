// src/core/service_client.rs
//! HTTP client for the analysis backend - JSON everywhere except the resume upload

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::{error, info, trace};

use crate::types::{
    AnalysisContext, AnalysisResult, AskRequest, AskResponse, CoverLetterRequest,
    CoverLetterResponse, UploadResponse,
};
use crate::upload::UploadedFile;

pub const COVER_LETTER_ENDPOINT: &str = "/api/cover-letter/generate";
pub const UPLOAD_RESUME_ENDPOINT: &str = "/api/upload-resume";
pub const ANALYZE_ENDPOINT: &str = "/api/analyze";
pub const ASK_ENDPOINT: &str = "/api/ask";

/// Everything the client needs from the backend. The session controller,
/// chat assistant and cover letter flow only talk to this trait.
#[async_trait]
pub trait CareerBackend: Send + Sync {
    /// Send a resume file, receive its extracted text
    async fn upload_resume(&self, file: &UploadedFile) -> Result<String>;

    async fn analyze(&self, context: &AnalysisContext) -> Result<AnalysisResult>;

    async fn ask(&self, request: &AskRequest) -> Result<String>;

    async fn generate_cover_letter(&self, request: &CoverLetterRequest) -> Result<CoverLetterResponse>;
}

pub struct ServiceClient {
    client: reqwest::Client,
    base_url: String,
}

impl ServiceClient {
    /// Create new service client. `base_url` is resolved once by the caller;
    /// an empty string produces origin-relative URLs.
    pub fn new(base_url: String, timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Generic POST request with JSON
    pub async fn post_json<T, R>(&self, endpoint: &str, payload: &T) -> Result<R>
    where
        T: serde::Serialize + ?Sized,
        R: serde::de::DeserializeOwned,
    {
        let url = self.endpoint_url(endpoint);
        trace!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .with_context(|| format!("Failed to POST to {}", url))?;

        Self::parse_response(response).await
    }

    /// Non-2xx is a failure; the body is only logged, never interpreted.
    async fn parse_response<R>(response: reqwest::Response) -> Result<R>
    where
        R: serde::de::DeserializeOwned,
    {
        let status = response.status();
        trace!("Response status: {}", status);

        if status.is_success() {
            response
                .json::<R>()
                .await
                .context("Failed to parse JSON response")
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Backend error response {}: {}", status, error_text);
            anyhow::bail!("HTTP {} error", status)
        }
    }
}

#[async_trait]
impl CareerBackend for ServiceClient {
    async fn upload_resume(&self, file: &UploadedFile) -> Result<String> {
        let url = self.endpoint_url(UPLOAD_RESUME_ENDPOINT);

        let file_content = tokio::fs::read(&file.source)
            .await
            .with_context(|| format!("Failed to read file: {}", file.source.display()))?;

        let form = Form::new().part(
            "file",
            Part::bytes(file_content)
                .file_name(file.name.clone())
                .mime_str(&file.mime_type)
                .context("Failed to create multipart")?,
        );

        info!("Uploading resume {} to {}", file.name, url);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .context("HTTP request failed")?;

        let upload: UploadResponse = Self::parse_response(response).await?;
        info!("Resume text extracted ({} chars)", upload.text.chars().count());
        Ok(upload.text)
    }

    async fn analyze(&self, context: &AnalysisContext) -> Result<AnalysisResult> {
        info!("Sending analysis request");
        self.post_json(ANALYZE_ENDPOINT, context).await
    }

    async fn ask(&self, request: &AskRequest) -> Result<String> {
        let response: AskResponse = self.post_json(ASK_ENDPOINT, request).await?;
        Ok(response.answer)
    }

    async fn generate_cover_letter(&self, request: &CoverLetterRequest) -> Result<CoverLetterResponse> {
        info!(
            "Requesting cover letter for {} at {}",
            request.job_title, request.company_name
        );
        self.post_json(COVER_LETTER_ENDPOINT, request).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted backend shared by the session, chat and cover letter tests.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Upload(String),
        Analyze(AnalysisContext),
        Ask(String, String, String),
        CoverLetter(CoverLetterRequest),
    }

    #[derive(Default)]
    pub struct FakeBackend {
        pub calls: Mutex<Vec<Call>>,
        pub upload_replies: Mutex<VecDeque<Result<String>>>,
        pub analyze_replies: Mutex<VecDeque<Result<AnalysisResult>>>,
        pub ask_replies: Mutex<VecDeque<Result<String>>>,
        pub cover_letter_replies: Mutex<VecDeque<Result<CoverLetterResponse>>>,
    }

    impl FakeBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_upload(self, reply: Result<String>) -> Self {
            self.upload_replies.lock().unwrap().push_back(reply);
            self
        }

        pub fn with_analyze(self, reply: Result<AnalysisResult>) -> Self {
            self.analyze_replies.lock().unwrap().push_back(reply);
            self
        }

        pub fn with_ask(self, reply: Result<String>) -> Self {
            self.ask_replies.lock().unwrap().push_back(reply);
            self
        }

        pub fn with_cover_letter(self, reply: Result<CoverLetterResponse>) -> Self {
            self.cover_letter_replies.lock().unwrap().push_back(reply);
            self
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn next<T>(queue: &Mutex<VecDeque<Result<T>>>, what: &str) -> Result<T> {
            queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow::anyhow!("no scripted reply for {}", what)))
        }
    }

    #[async_trait]
    impl CareerBackend for FakeBackend {
        async fn upload_resume(&self, file: &UploadedFile) -> Result<String> {
            self.calls.lock().unwrap().push(Call::Upload(file.name.clone()));
            Self::next(&self.upload_replies, "upload")
        }

        async fn analyze(&self, context: &AnalysisContext) -> Result<AnalysisResult> {
            self.calls.lock().unwrap().push(Call::Analyze(context.clone()));
            Self::next(&self.analyze_replies, "analyze")
        }

        async fn ask(&self, request: &AskRequest) -> Result<String> {
            self.calls.lock().unwrap().push(Call::Ask(
                request.question.clone(),
                request.resume_text.clone(),
                request.job_description.clone(),
            ));
            Self::next(&self.ask_replies, "ask")
        }

        async fn generate_cover_letter(&self, request: &CoverLetterRequest) -> Result<CoverLetterResponse> {
            self.calls.lock().unwrap().push(Call::CoverLetter(request.clone()));
            Self::next(&self.cover_letter_replies, "cover letter")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// One-shot HTTP stub: answers the first request with `status` and a JSON
    /// `body`, and hands back the raw request it received.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request
        });

        (base_url, handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            let Some(header_end) = text.find("\r\n\r\n") else {
                continue;
            };
            let headers = text[..header_end].to_ascii_lowercase();
            let body_len = buf.len() - header_end - 4;
            let complete = match headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
            {
                Some(len) => body_len >= len.trim().parse::<usize>().unwrap(),
                None => {
                    !headers.contains("transfer-encoding: chunked") || text.ends_with("0\r\n\r\n")
                }
            };
            if complete {
                break;
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[test]
    fn test_endpoint_urls_share_one_base() {
        let client = ServiceClient::new("https://compass.example.com/".to_string(), 5).unwrap();
        assert_eq!(client.base_url(), "https://compass.example.com");
        assert_eq!(
            client.endpoint_url(ASK_ENDPOINT),
            "https://compass.example.com/api/ask"
        );
        assert_eq!(
            client.endpoint_url(UPLOAD_RESUME_ENDPOINT),
            "https://compass.example.com/api/upload-resume"
        );
    }

    #[test]
    fn test_empty_base_gives_relative_paths() {
        let client = ServiceClient::new(String::new(), 5).unwrap();
        assert_eq!(client.endpoint_url(ANALYZE_ENDPOINT), "/api/analyze");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_an_error() {
        // Port 9 (discard) on localhost is not expected to run an HTTP server.
        let client = ServiceClient::new("http://127.0.0.1:9".to_string(), 2).unwrap();
        let result = client
            .analyze(&AnalysisContext::new("resume", "jd"))
            .await;
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("Failed to POST to http://127.0.0.1:9/api/analyze"));
    }

    #[tokio::test]
    async fn test_upload_missing_file_fails_before_network() {
        let client = ServiceClient::new("http://127.0.0.1:9".to_string(), 2).unwrap();
        let file = UploadedFile {
            id: uuid::Uuid::new_v4(),
            name: "gone.pdf".to_string(),
            size: 0,
            mime_type: "application/pdf".to_string(),
            source: std::path::PathBuf::from("/definitely/not/here/gone.pdf"),
            uploaded_at: chrono::Utc::now(),
        };
        let message = format!("{:#}", client.upload_resume(&file).await.unwrap_err());
        assert!(message.contains("Failed to read file"));
    }

    #[tokio::test]
    async fn test_upload_sends_multipart_file_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.pdf");
        std::fs::write(&path, b"%PDF-1.4 resume body").unwrap();
        let file = UploadedFile {
            id: uuid::Uuid::new_v4(),
            name: "resume.pdf".to_string(),
            size: 20,
            mime_type: "application/pdf".to_string(),
            source: path,
            uploaded_at: chrono::Utc::now(),
        };

        let (base_url, server) = serve_once("200 OK", r#"{"text": "Extracted resume"}"#).await;
        let client = ServiceClient::new(base_url, 5).unwrap();

        let text = client.upload_resume(&file).await.unwrap();
        assert_eq!(text, "Extracted resume");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/upload-resume "));
        assert!(request.contains(r#"name="file""#));
        assert!(request.contains(r#"filename="resume.pdf""#));
        assert!(request.contains("%PDF-1.4 resume body"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let (base_url, server) =
            serve_once("500 Internal Server Error", r#"{"error": "model offline"}"#).await;
        let client = ServiceClient::new(base_url, 5).unwrap();

        let err = client
            .analyze(&AnalysisContext::new("resume", "jd"))
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("HTTP 500"));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/analyze "));
        assert!(request.contains(r#""resumeText":"resume""#));
        assert!(request.contains(r#""jobDescription":"jd""#));
    }

    #[tokio::test]
    async fn test_ask_posts_camel_case_and_reads_answer() {
        let (base_url, server) = serve_once("200 OK", r#"{"answer": "Tailor your summary."}"#).await;
        let client = ServiceClient::new(base_url, 5).unwrap();

        let answer = client
            .ask(&AskRequest {
                question: "How do I stand out?".to_string(),
                resume_text: "resume".to_string(),
                job_description: "jd".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(answer, "Tailor your summary.");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/ask "));
        assert!(request.contains(r#""question":"How do I stand out?""#));
        assert!(request.contains(r#""resumeText":"resume""#));
    }

    #[tokio::test]
    async fn test_cover_letter_without_letter_parses_as_none() {
        let (base_url, server) = serve_once("200 OK", "{}").await;
        let client = ServiceClient::new(base_url, 5).unwrap();

        let response = client
            .generate_cover_letter(&CoverLetterRequest::default())
            .await
            .unwrap();
        assert!(response.cover_letter.is_none());

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/cover-letter/generate "));
    }
}

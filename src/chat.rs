// src/chat.rs
//! Career assistant chat widget state.

use std::sync::Arc;
use tracing::{debug, error, info};

use crate::core::{CareerBackend, LocalStore};
use crate::types::{AnalysisContext, AskRequest};

pub const GREETING: &str =
    "Hi! I'm your AI Career Coach. Ask me anything about your resume or the job description!";

pub const CONNECTION_FAILURE_REPLY: &str =
    "Sorry, I'm having trouble connecting to the server. Please try again.";

/// Number of leading characters of a known question used for fuzzy matching.
const FAQ_PREFIX_CHARS: usize = 20;

/// Questions answered locally, in lookup order.
pub const FAQS: [(&str, &str); 3] = [
    (
        "I'm not able to upload my resume. What do I do?",
        "If you're having trouble uploading your resume, try these steps:\n\n\
1. Make sure your file is in PDF, DOCX, DOC, or TXT format\n\
2. Ensure the file size is under 5MB\n\
3. Try using the 'Paste Text' tab instead and copy-paste your resume content\n\
4. Clear your browser cache and try again\n\
5. If the issue persists, try a different browser\n\n\
Need more help? Feel free to ask!",
    ),
    (
        "My resume was not read correctly. What do I do?",
        "If your resume wasn't read correctly, here's what you can do:\n\n\
1. Use the 'Paste Text' option - this often works better than file upload\n\
2. Make sure your resume has selectable text (not a scanned image)\n\
3. Avoid complex formatting, tables, or multi-column layouts\n\
4. Convert your resume to plain text or a simple PDF format\n\
5. Remove any special characters or unusual fonts\n\n\
For best results, use a clean, ATS-friendly resume format!",
    ),
    (
        "I don't have any work experience. What should I do?",
        "No work experience? No problem! Here's what you can do:\n\n\
1. **Include relevant coursework** and academic projects\n\
2. **Add internships or volunteer work** - they count as experience\n\
3. **Highlight transferable skills** like communication, teamwork, or problem-solving\n\
4. **Include certifications** or online courses you've completed\n\
5. **Focus on your education** and any academic achievements\n\
6. **Add personal projects** or portfolio work\n\n\
Remember: Everyone starts somewhere, and employers understand that!",
    ),
];

/// Exact match first, then a case-insensitive check for the first
/// characters of each known question anywhere in the input.
pub fn faq_answer(question: &str) -> Option<&'static str> {
    if let Some((_, answer)) = FAQS.iter().find(|(q, _)| *q == question) {
        return Some(*answer);
    }

    let lowered = question.to_lowercase();
    FAQS.iter()
        .find(|(q, _)| {
            let prefix: String = q.to_lowercase().chars().take(FAQ_PREFIX_CHARS).collect();
            lowered.contains(&prefix)
        })
        .map(|(_, answer)| *answer)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: String,
    pub is_user: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Faq,
    Backend,
    ConnectionFailure,
}

/// Receives every visible change of the chat log.
pub trait ChatSink: Send + Sync {
    /// The loading placeholder was shown (`true`) or removed (`false`).
    fn on_loading(&self, loading: bool);
    fn on_message(&self, message: &ChatMessage);
}

pub struct ChatAssistant {
    open: bool,
    messages: Vec<ChatMessage>,
    loading: bool,
    suggestions_visible: bool,
    sink: Arc<dyn ChatSink>,
}

impl ChatAssistant {
    /// A closed widget whose log starts with the greeting.
    pub fn new(sink: Arc<dyn ChatSink>) -> Self {
        Self {
            open: false,
            messages: vec![ChatMessage {
                text: GREETING.to_string(),
                is_user: false,
            }],
            loading: false,
            suggestions_visible: true,
            sink,
        }
    }

    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// True only while a reply is pending.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn suggestions_visible(&self) -> bool {
        self.suggestions_visible
    }

    pub fn suggested_questions(&self) -> impl Iterator<Item = &'static str> {
        FAQS.iter().map(|(q, _)| *q)
    }

    /// Send the suggested question at `index`. The suggestions are hidden
    /// after the first one is used.
    pub async fn ask_suggested(
        &mut self,
        index: usize,
        backend: &dyn CareerBackend,
        store: &LocalStore,
    ) -> Option<(ReplySource, &ChatMessage)> {
        if !self.suggestions_visible {
            return None;
        }
        let (question, _) = *FAQS.get(index)?;
        self.suggestions_visible = false;
        self.send_message(question, backend, store).await
    }

    fn push(&mut self, text: impl Into<String>, is_user: bool) {
        let message = ChatMessage {
            text: text.into(),
            is_user,
        };
        self.sink.on_message(&message);
        self.messages.push(message);
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.sink.on_loading(loading);
    }

    /// Append the user's question and the assistant's reply. Blank input is
    /// ignored and returns `None`.
    pub async fn send_message(
        &mut self,
        text: &str,
        backend: &dyn CareerBackend,
        store: &LocalStore,
    ) -> Option<(ReplySource, &ChatMessage)> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.push(text, true);
        self.set_loading(true);

        let (source, reply) = match faq_answer(text) {
            Some(answer) => {
                debug!("Answered from FAQ");
                (ReplySource::Faq, answer.to_string())
            }
            None => self.ask_backend(text, backend, store).await,
        };

        // The placeholder goes before the reply on every path.
        self.set_loading(false);
        self.push(reply, false);
        self.messages.last().map(|m| (source, m))
    }

    async fn ask_backend(
        &self,
        question: &str,
        backend: &dyn CareerBackend,
        store: &LocalStore,
    ) -> (ReplySource, String) {
        let context = store.analysis_context().unwrap_or_else(|err| {
            error!("Error reading analysis context: {:#}", err);
            None
        });
        let AnalysisContext {
            resume_text,
            job_description,
        } = context.unwrap_or_default();

        let request = AskRequest {
            question: question.to_string(),
            resume_text,
            job_description,
        };

        match backend.ask(&request).await {
            Ok(answer) => {
                info!("Assistant answered from backend");
                (ReplySource::Backend, answer)
            }
            Err(err) => {
                error!("Chat request failed: {:#}", err);
                (
                    ReplySource::ConnectionFailure,
                    CONNECTION_FAILURE_REPLY.to_string(),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::service_client::testing::{Call, FakeBackend};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Loading(bool),
        Message(String, bool),
    }

    /// Records the order in which the log changes.
    #[derive(Default)]
    struct RecordingChat(Mutex<Vec<Event>>);

    impl ChatSink for RecordingChat {
        fn on_loading(&self, loading: bool) {
            self.0.lock().unwrap().push(Event::Loading(loading));
        }

        fn on_message(&self, message: &ChatMessage) {
            self.0
                .lock()
                .unwrap()
                .push(Event::Message(message.text.clone(), message.is_user));
        }
    }

    impl RecordingChat {
        fn events(&self) -> Vec<Event> {
            self.0.lock().unwrap().clone()
        }
    }

    fn assistant() -> (ChatAssistant, Arc<RecordingChat>) {
        let sink = Arc::new(RecordingChat::default());
        (ChatAssistant::new(sink.clone()), sink)
    }

    fn bot(text: &str) -> ChatMessage {
        ChatMessage {
            text: text.to_string(),
            is_user: false,
        }
    }

    fn user(text: &str) -> ChatMessage {
        ChatMessage {
            text: text.to_string(),
            is_user: true,
        }
    }

    /// Question, placeholder shown, placeholder removed, reply.
    fn exchange(question: &str, reply: &str) -> Vec<Event> {
        vec![
            Event::Message(question.to_string(), true),
            Event::Loading(true),
            Event::Loading(false),
            Event::Message(reply.to_string(), false),
        ]
    }

    #[test]
    fn test_log_starts_with_greeting() {
        let (chat, sink) = assistant();
        assert_eq!(chat.messages(), &[bot(GREETING)]);
        assert!(chat.suggestions_visible());
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_exact_faq_question_needs_no_network() {
        let backend = FakeBackend::new();
        let store = LocalStore::in_memory();
        let (mut chat, sink) = assistant();
        let question = "I don't have any work experience. What should I do?";

        let (source, reply) = chat.send_message(question, &backend, &store).await.unwrap();

        assert_eq!(source, ReplySource::Faq);
        assert!(reply.text.starts_with("No work experience? No problem!"));
        assert!(!reply.is_user);
        assert!(backend.calls().is_empty());
        assert!(!chat.is_loading());
        assert_eq!(chat.messages().len(), 3);
        assert_eq!(sink.events(), exchange(question, FAQS[2].1));
    }

    #[test]
    fn test_faq_prefix_match_is_case_insensitive() {
        let answer = faq_answer("hey, MY RESUME WAS NOT READ properly at all").unwrap();
        assert!(answer.starts_with("If your resume wasn't read correctly"));

        assert!(faq_answer("How do I negotiate salary?").is_none());
    }

    #[tokio::test]
    async fn test_unmatched_question_without_context_sends_empty_strings() {
        let backend = FakeBackend::new().with_ask(Ok("Focus on Rust projects.".to_string()));
        let store = LocalStore::in_memory();
        let (mut chat, sink) = assistant();

        let (source, reply) = chat
            .send_message("What should I learn next?", &backend, &store)
            .await
            .unwrap();
        assert_eq!(source, ReplySource::Backend);
        assert_eq!(reply.text, "Focus on Rust projects.");

        assert_eq!(
            backend.calls(),
            vec![Call::Ask(
                "What should I learn next?".to_string(),
                String::new(),
                String::new()
            )]
        );
        assert_eq!(
            sink.events(),
            exchange("What should I learn next?", "Focus on Rust projects.")
        );
    }

    #[tokio::test]
    async fn test_stored_context_is_forwarded() {
        let backend = FakeBackend::new().with_ask(Ok("answer".to_string()));
        let store = LocalStore::in_memory();
        store
            .set_analysis_context(&AnalysisContext::new("My resume", "The job"))
            .unwrap();
        let (mut chat, _) = assistant();

        chat.send_message("Am I a good fit?", &backend, &store).await;

        assert_eq!(
            backend.calls(),
            vec![Call::Ask(
                "Am I a good fit?".to_string(),
                "My resume".to_string(),
                "The job".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_backend_failure_appends_apology_and_clears_loading() {
        let backend = FakeBackend::new().with_ask(Err(anyhow::anyhow!("HTTP 503 error")));
        let store = LocalStore::in_memory();
        let (mut chat, sink) = assistant();

        let (source, reply) = chat
            .send_message("Tell me about my gaps", &backend, &store)
            .await
            .unwrap();
        assert_eq!(source, ReplySource::ConnectionFailure);
        assert_eq!(reply.text, CONNECTION_FAILURE_REPLY);
        assert!(!chat.is_loading());
        assert_eq!(
            chat.messages(),
            &[
                bot(GREETING),
                user("Tell me about my gaps"),
                bot(CONNECTION_FAILURE_REPLY),
            ]
        );
        assert_eq!(
            sink.events(),
            exchange("Tell me about my gaps", CONNECTION_FAILURE_REPLY)
        );
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let backend = FakeBackend::new();
        let store = LocalStore::in_memory();
        let (mut chat, sink) = assistant();

        assert!(chat.send_message("   \n", &backend, &store).await.is_none());
        assert_eq!(chat.messages().len(), 1);
        assert!(backend.calls().is_empty());
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_suggestions_hide_after_first_use() {
        let backend = FakeBackend::new();
        let store = LocalStore::in_memory();
        let (mut chat, _) = assistant();

        let (source, reply) = chat.ask_suggested(0, &backend, &store).await.unwrap();
        assert_eq!(source, ReplySource::Faq);
        assert_eq!(reply.text, FAQS[0].1);
        assert!(!chat.suggestions_visible());
        assert_eq!(chat.messages()[1], user(FAQS[0].0));

        assert!(chat.ask_suggested(1, &backend, &store).await.is_none());
        assert_eq!(chat.messages().len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_suggestion_keeps_suggestions() {
        let backend = FakeBackend::new();
        let store = LocalStore::in_memory();
        let (mut chat, _) = assistant();

        assert!(chat.ask_suggested(7, &backend, &store).await.is_none());
        assert!(chat.suggestions_visible());
    }

    #[test]
    fn test_toggle_and_suggestions() {
        let (mut chat, _) = assistant();
        assert!(!chat.is_open());
        assert!(chat.toggle());
        assert!(!chat.toggle());
        assert_eq!(chat.suggested_questions().count(), 3);
    }
}

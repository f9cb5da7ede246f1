//! Request orchestration for the summarise-then-converse flow.
//!
//! `SessionState` owns everything the user sees. It only changes through the
//! summarise and question operations. Each operation comes in two halves
//! (`begin_*` / `finish_*`) so a front end can run the HTTP call elsewhere and
//! hand the result back, plus an async `submit_*` that does both in one step.

use crate::client::{ClientError, ServiceClient};
use crate::summary::{
    AskRequest, AskResponse, Exchange, Style, SummarizeRequest, SummarizeResponse,
    SummaryResult,
};
use thiserror::Error;

/// Why an operation was refused before any request was sent
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    #[error("Please enter a URL to summarize")]
    EmptyUrl,
    #[error("question is empty")]
    EmptyQuestion,
    #[error("no active session")]
    NoSession,
    #[error("a request is already in flight")]
    Busy,
}

/// What an operation did to the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The response was applied
    Applied,
    /// The request failed and `last_error` was set
    Failed,
    /// The response belonged to a superseded request and was dropped
    Discarded,
    /// Nothing was sent
    Rejected(Rejected),
}

/// Token bookkeeping for one kind of request.
///
/// At most one request is pending; tokens increase monotonically so a result
/// can be matched to the request that produced it.
#[derive(Debug, Default)]
struct Slot {
    last_issued: u64,
    pending: Option<u64>,
}

impl Slot {
    fn issue(&mut self) -> Option<u64> {
        if self.pending.is_some() {
            return None;
        }
        self.last_issued += 1;
        self.pending = Some(self.last_issued);
        Some(self.last_issued)
    }

    /// Returns true if `token` was the pending request, clearing it
    fn settle(&mut self, token: u64) -> bool {
        if self.pending == Some(token) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    fn busy(&self) -> bool {
        self.pending.is_some()
    }
}

/// An issued summarise request
#[derive(Debug, Clone)]
pub struct SummarizeTicket {
    token: u64,
    pub request: SummarizeRequest,
}

/// An issued question
#[derive(Debug, Clone)]
pub struct QuestionTicket {
    token: u64,
    pub request: AskRequest,
}

/// All client-visible state.
#[derive(Debug, Default)]
pub struct SessionState {
    url: String,
    style: Style,
    question: String,
    session_id: Option<String>,
    result: Option<SummaryResult>,
    history: Vec<Exchange>,
    last_error: Option<String>,
    summarize: Slot,
    ask: Slot,
}

impl SessionState {
    /// Fresh state with the given style preselected
    pub fn new(style: Style) -> Self {
        Self {
            style,
            ..Default::default()
        }
    }

    /// State attached to a session opened earlier, with no summary loaded
    pub fn resume(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            ..Default::default()
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn url_mut(&mut self) -> &mut String {
        &mut self.url
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn set_question(&mut self, question: impl Into<String>) {
        self.question = question.into();
    }

    pub fn question_mut(&mut self) -> &mut String {
        &mut self.question
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn result(&self) -> Option<&SummaryResult> {
        self.result.as_ref()
    }

    pub fn history(&self) -> &[Exchange] {
        &self.history
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_summarizing(&self) -> bool {
        self.summarize.busy()
    }

    pub fn is_asking(&self) -> bool {
        self.ask.busy()
    }

    /// Validate the URL input and mark a summarise request as in flight.
    ///
    /// Clears the previous error and result. Session and history stay until a
    /// new session replaces them.
    pub fn begin_summarize(&mut self) -> Result<SummarizeTicket, Rejected> {
        let url = self.url.trim();
        if url.is_empty() {
            self.last_error = Some(Rejected::EmptyUrl.to_string());
            return Err(Rejected::EmptyUrl);
        }
        let request = SummarizeRequest {
            url: url.to_string(),
            style: self.style,
        };
        let token = self.summarize.issue().ok_or(Rejected::Busy)?;
        self.last_error = None;
        self.result = None;
        Ok(SummarizeTicket { token, request })
    }

    /// Apply the result of a summarise request.
    pub fn finish_summarize(
        &mut self,
        ticket: SummarizeTicket,
        result: Result<SummarizeResponse, ClientError>,
    ) -> Outcome {
        if !self.summarize.settle(ticket.token) {
            tracing::debug!(token = ticket.token, "discarding stale summarise result");
            return Outcome::Discarded;
        }
        match result {
            Ok(response) => {
                let (summary, session_id) = response.into_parts();
                tracing::info!(
                    session = %session_id,
                    insights = summary.key_insights.len(),
                    "summary received"
                );
                self.result = Some(summary);
                self.session_id = Some(session_id);
                self.history.clear();
                Outcome::Applied
            }
            Err(err) => {
                tracing::warn!(url = %ticket.request.url, "summarise failed: {}", err);
                self.last_error = Some(err.to_string());
                Outcome::Failed
            }
        }
    }

    /// Validate the question input and mark an ask request as in flight.
    ///
    /// Clears the previous error. Rejections here leave the state untouched.
    pub fn begin_question(&mut self) -> Result<QuestionTicket, Rejected> {
        let question = self.question.trim();
        if question.is_empty() {
            return Err(Rejected::EmptyQuestion);
        }
        let session_id = self.session_id.clone().ok_or(Rejected::NoSession)?;
        let request = AskRequest {
            session_id,
            question: question.to_string(),
        };
        let token = self.ask.issue().ok_or(Rejected::Busy)?;
        self.last_error = None;
        Ok(QuestionTicket { token, request })
    }

    /// Apply the result of a question.
    ///
    /// The returned history replaces ours wholesale. If a newer summarise has
    /// started another session since the question was sent, the answer is
    /// dropped.
    pub fn finish_question(
        &mut self,
        ticket: QuestionTicket,
        result: Result<AskResponse, ClientError>,
    ) -> Outcome {
        if !self.ask.settle(ticket.token) {
            tracing::debug!(token = ticket.token, "discarding stale answer");
            return Outcome::Discarded;
        }
        if self.session_id.as_deref() != Some(ticket.request.session_id.as_str()) {
            tracing::debug!(
                session = %ticket.request.session_id,
                "discarding answer for superseded session"
            );
            return Outcome::Discarded;
        }
        match result {
            Ok(response) => {
                tracing::info!(
                    session = %ticket.request.session_id,
                    exchanges = response.conversation_history.len(),
                    "answer received"
                );
                self.history = response.conversation_history;
                self.question.clear();
                Outcome::Applied
            }
            Err(err) => {
                tracing::warn!(session = %ticket.request.session_id, "ask failed: {}", err);
                self.last_error = Some(err.to_string());
                Outcome::Failed
            }
        }
    }

    /// Summarise the current URL with the current style.
    pub async fn submit_summarize(&mut self, client: &ServiceClient) -> Outcome {
        match self.begin_summarize() {
            Ok(ticket) => {
                let result = client.summarize(&ticket.request).await;
                self.finish_summarize(ticket, result)
            }
            Err(reason) => Outcome::Rejected(reason),
        }
    }

    /// Ask the current question within the active session.
    pub async fn submit_question(&mut self, client: &ServiceClient) -> Outcome {
        match self.begin_question() {
            Ok(ticket) => {
                let result = client.ask(&ticket.request).await;
                self.finish_question(ticket, result)
            }
            Err(reason) => Outcome::Rejected(reason),
        }
    }
}

//! Routine generation and follow-up Q&A over one in-memory transcript.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use shared::{
    domain::Product,
    protocol::{ChatTurn, CompletionRequest},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

use crate::{
    completion::CompletionBackend,
    events::AdvisorEvent,
    prompts::{
        routine_request, EMPTY_SELECTION_GUIDANCE, FOLLOW_UP_FALLBACK_REPLY, FOLLOW_UP_LOADING,
        FOLLOW_UP_SYSTEM_PROMPT, REQUEST_IN_FLIGHT_GUIDANCE, ROUTINE_FALLBACK_REPLY,
        ROUTINE_LOADING, ROUTINE_SYSTEM_PROMPT,
    },
    views::{render_transcript, ChatView},
};

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub model: String,
    pub max_tokens: u32,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Ordered user/assistant turns. When a routine request seeded the
/// conversation, that first turn is kept for the endpoint but never shown.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<ChatTurn>,
    seeded_by_routine: bool,
}

impl Transcript {
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn visible(&self) -> &[ChatTurn] {
        if self.seeded_by_routine && !self.turns.is_empty() {
            &self.turns[1..]
        } else {
            &self.turns
        }
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    fn reset_with_routine_request(&mut self, content: String) {
        self.turns = vec![ChatTurn::user(content)];
        self.seeded_by_routine = true;
    }

    fn push(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }
}

/// Clears the in-flight flag on every exit path.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct ChatSession {
    backend: Arc<dyn CompletionBackend>,
    options: ChatOptions,
    transcript: Mutex<Transcript>,
    view: Mutex<ChatView>,
    in_flight: AtomicBool,
    events: broadcast::Sender<AdvisorEvent>,
}

impl ChatSession {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        options: ChatOptions,
        events: broadcast::Sender<AdvisorEvent>,
    ) -> Self {
        Self {
            backend,
            options,
            transcript: Mutex::new(Transcript::default()),
            view: Mutex::new(ChatView::default()),
            in_flight: AtomicBool::new(false),
            events,
        }
    }

    pub async fn transcript(&self) -> Transcript {
        self.transcript.lock().await.clone()
    }

    pub async fn current_view(&self) -> ChatView {
        self.view.lock().await.clone()
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Starts a fresh conversation about `selection`. Failures end up in the
    /// returned view, never as an error.
    pub async fn start_routine(&self, selection: &[Product]) -> ChatView {
        if selection.is_empty() {
            return self
                .show(ChatView::Placeholder(EMPTY_SELECTION_GUIDANCE.to_string()))
                .await;
        }
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            return self.reject_busy().await;
        };

        let request_text = match routine_request(selection) {
            Ok(text) => text,
            Err(err) => return self.show(ChatView::Error(err.to_string())).await,
        };

        let messages = {
            let mut transcript = self.transcript.lock().await;
            transcript.reset_with_routine_request(request_text);
            with_system_prompt(ROUTINE_SYSTEM_PROMPT, transcript.turns())
        };
        info!(products = selection.len(), "requesting routine");
        self.exchange(messages, ROUTINE_LOADING, ROUTINE_FALLBACK_REPLY)
            .await
    }

    /// Returns `None` when `text` is blank; nothing is sent or rendered then.
    pub async fn ask_follow_up(&self, text: &str) -> Option<ChatView> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            return Some(self.reject_busy().await);
        };

        let messages = {
            let mut transcript = self.transcript.lock().await;
            transcript.push(ChatTurn::user(text));
            with_system_prompt(FOLLOW_UP_SYSTEM_PROMPT, transcript.turns())
        };
        info!(turns = messages.len() - 1, "sending follow-up");
        Some(
            self.exchange(messages, FOLLOW_UP_LOADING, FOLLOW_UP_FALLBACK_REPLY)
                .await,
        )
    }

    async fn exchange(
        &self,
        messages: Vec<ChatTurn>,
        loading: &str,
        fallback_reply: &str,
    ) -> ChatView {
        self.show(ChatView::Loading(loading.to_string())).await;

        let request = CompletionRequest {
            model: self.options.model.clone(),
            messages,
            max_tokens: self.options.max_tokens,
        };

        match self.backend.complete(&request).await {
            Ok(response) => {
                let reply = match response.reply_text() {
                    Some(text) => text.to_string(),
                    None => {
                        warn!("completion carried no reply text; using fallback");
                        fallback_reply.to_string()
                    }
                };
                let view = {
                    let mut transcript = self.transcript.lock().await;
                    transcript.push(ChatTurn::assistant(reply));
                    render_transcript(transcript.visible())
                };
                self.show(view).await
            }
            Err(err) => {
                warn!(error = %err, "completion request failed");
                self.show(ChatView::Error(err.to_string())).await
            }
        }
    }

    // The outstanding reply replaces this view once it lands.
    async fn reject_busy(&self) -> ChatView {
        info!("rejecting chat request while another is in flight");
        self.show(ChatView::Placeholder(REQUEST_IN_FLIGHT_GUIDANCE.to_string()))
            .await
    }

    async fn show(&self, view: ChatView) -> ChatView {
        *self.view.lock().await = view.clone();
        let _ = self.events.send(AdvisorEvent::ChatRendered(view.clone()));
        view
    }
}

fn with_system_prompt(system_prompt: &str, turns: &[ChatTurn]) -> Vec<ChatTurn> {
    let mut messages = Vec::with_capacity(turns.len() + 1);
    messages.push(ChatTurn::system(system_prompt));
    messages.extend_from_slice(turns);
    messages
}

#[cfg(test)]
#[path = "tests/chat_tests.rs"]
mod tests;

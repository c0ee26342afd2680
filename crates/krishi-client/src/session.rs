//! In-memory chat session with single-flight sends.
//!
//! A session moves `Idle → Sending → Idle`. While a send is in flight any
//! further send is dropped, not queued. The busy flag is released by a drop
//! guard, so it is cleared on success, failure, and cancellation alike.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{debug, warn};

use crate::api::ProxyApi;
use crate::message::{ChatMessage, Sender};

/// First bot message of every session.
pub const GREETING: &str = "Namaste! I am Krishi Mitra, your farming assistant. \
I am here to help the farmers of Kerala. Ask me anything about crops, pests, \
weather or farming practice.";

/// Bot reply used when a failed request carries no server hint.
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// Why a send did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The text was empty or whitespace-only.
    Empty,
    /// Another send was still in flight.
    Busy,
}

/// Result of [`ChatSession::send_message`].
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    Ignored(IgnoreReason),
    /// The bot message appended for this send.
    Replied(ChatMessage),
}

/// One farmer's conversation with the assistant, sending at most one request at a time.
pub struct ChatSession<A> {
    api: A,
    messages: Mutex<Vec<ChatMessage>>,
    next_id: AtomicU64,
    busy: AtomicBool,
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<A: ProxyApi> ChatSession<A> {
    /// New session seeded with [`GREETING`].
    pub fn new(api: A) -> Self {
        Self::with_greeting(api, GREETING)
    }

    pub fn with_greeting(api: A, greeting: impl Into<String>) -> Self {
        let session = Self {
            api,
            messages: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            busy: AtomicBool::new(false),
        };
        session.push(Sender::Bot, greeting.into(), false);
        session
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// `true` while a send is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Snapshot of the conversation in insertion order.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn last(&self) -> Option<ChatMessage> {
        self.lock().last().cloned()
    }

    /// Send `text` to the proxy and append the exchange to the conversation.
    ///
    /// The user message is appended before the request is issued; exactly one
    /// bot message is appended when it resolves.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        if text.trim().is_empty() {
            return SendOutcome::Ignored(IgnoreReason::Empty);
        }
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("send dropped: a request is already in flight");
            return SendOutcome::Ignored(IgnoreReason::Busy);
        }
        let _guard = BusyGuard(&self.busy);

        self.push(Sender::User, text.to_owned(), false);

        let reply = match self.api.send_message(text).await {
            Ok(response) => self.push(Sender::Bot, response.response, false),
            Err(e) => {
                warn!(error = %e, "chat request failed");
                let text = e.user_message().unwrap_or(FALLBACK_REPLY).to_owned();
                self.push(Sender::Bot, text, true)
            }
        };
        SendOutcome::Replied(reply)
    }

    fn push(&self, sender: Sender, text: String, is_error: bool) -> ChatMessage {
        let message = ChatMessage {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            text,
            sender,
            is_error,
            timestamp: Utc::now(),
        };
        self.lock().push(message.clone());
        message
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ChatMessage>> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

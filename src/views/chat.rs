//! Chat view: conversations, the active message log, and the send cycle.
//!
//! Sending is optimistic. The user's message lands in the local log before
//! the completion service is asked, and whatever comes back (a reply or a
//! fixed apology) is persisted together with it.
//!
//! `send` holds the view mutably until the exchange is persisted, so a
//! second send cannot start while one is pending. The loading indicator is
//! browser state: the dashboard disables the composer while its request is
//! in flight.
use std::rc::Rc;

use chrono::Utc;
use serde::Serialize;

use crate::completion::CompletionClient;
use crate::store::{
    Collection, Conversation, ConversationPatch, ListQuery, Message, NewConversation,
    RecordStore, RecordStoreExt,
};

/// Title given to freshly created conversations.
pub const NEW_CONVERSATION_TITLE: &str = "New Conversation";

/// The first exchange renames a conversation to this many characters of
/// the user's message.
pub const TITLE_MAX_CHARS: usize = 50;

/// Reply used when the service answers without a `response` field.
pub const MISSING_RESPONSE_REPLY: &str = "Sorry, I encountered an error processing your request.";

/// Reply used when the service can't be reached or its answer can't be read.
pub const UNREACHABLE_REPLY: &str =
    "Sorry, I encountered an error. Please make sure the Flask backend is running.";

/// What a call to [`ChatView::send`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SendOutcome {
    /// Empty input, no active conversation, or a send already in flight.
    Skipped,
    /// The service replied.
    Answered,
    /// The service answered without a response; the fallback text was used.
    Fallback,
    /// The exchange failed; the apology was appended instead.
    Failed,
}

pub struct ChatView {
    store: Rc<dyn RecordStore>,
    completion: Rc<dyn CompletionClient>,
    owner: String,
    conversations: Vec<Conversation>,
    active: Option<String>,
    messages: Vec<Message>,
    input: String,
}

impl ChatView {
    /// Build the view, load conversations (most recently updated first) and
    /// activate the newest one.
    pub fn mount(
        store: Rc<dyn RecordStore>,
        completion: Rc<dyn CompletionClient>,
        owner: impl Into<String>,
    ) -> Self {
        let mut view = Self {
            store,
            completion,
            owner: owner.into(),
            conversations: Vec::new(),
            active: None,
            messages: Vec::new(),
            input: String::new(),
        };

        let query = ListQuery::owned_by(&view.owner).newest_first("updated_at");
        view.conversations = view
            .store
            .list(Collection::Conversations, &query)
            .unwrap_or_default();

        if let Some(first) = view.conversations.first() {
            let id = first.id.clone();
            view.select(&id);
        }

        view
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn active(&self) -> Option<&Conversation> {
        let id = self.active.as_deref()?;
        self.conversations.iter().find(|c| c.id == id)
    }

    fn active_index(&self) -> Option<usize> {
        let id = self.active.as_deref()?;
        self.conversations.iter().position(|c| c.id == id)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    /// True when the "No conversations yet" placeholder should show.
    pub fn shows_empty_state(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Make `id` the active conversation and show its stored messages.
    ///
    /// Unknown ids leave everything as it was.
    pub fn select(&mut self, id: &str) -> bool {
        let Some(conversation) = self.conversations.iter().find(|c| c.id == id) else {
            return false;
        };
        self.messages = conversation.messages.clone();
        self.active = Some(conversation.id.clone());
        true
    }

    /// Create an empty conversation, put it at the top and activate it.
    pub fn new_conversation(&mut self) -> bool {
        let new_conversation = NewConversation {
            user_id: self.owner.clone(),
            title: NEW_CONVERSATION_TITLE.to_string(),
            messages: Vec::new(),
        };

        let Ok(conversation) = self
            .store
            .insert_record::<Conversation, _>(Collection::Conversations, &new_conversation)
        else {
            return false;
        };

        self.active = Some(conversation.id.clone());
        self.conversations.insert(0, conversation);
        self.messages.clear();
        true
    }

    /// Send the pending input to the active conversation.
    pub fn send(&mut self) -> SendOutcome {
        if self.input.trim().is_empty() {
            return SendOutcome::Skipped;
        }
        let Some(index) = self.active_index() else {
            return SendOutcome::Skipped;
        };

        let text = std::mem::take(&mut self.input);
        let history = self.messages.clone();
        self.messages.push(Message::user(text.clone()));

        let (reply, outcome) = match self.completion.complete(&text, &history) {
            Ok(Some(response)) if !response.is_empty() => (response, SendOutcome::Answered),
            Ok(_) => (MISSING_RESPONSE_REPLY.to_string(), SendOutcome::Fallback),
            Err(e) => {
                eprintln!("error sending message: {e:#}");
                (UNREACHABLE_REPLY.to_string(), SendOutcome::Failed)
            }
        };
        self.messages.push(Message::assistant(reply));

        let conversation = &mut self.conversations[index];
        let title = if self.messages.len() == 2 {
            text.chars().take(TITLE_MAX_CHARS).collect()
        } else {
            conversation.title.clone()
        };

        let patch = ConversationPatch {
            messages: self.messages.clone(),
            title,
            updated_at: Utc::now(),
        };
        // A failed write is not reported; the log stays as the user sees it.
        let _ = self
            .store
            .update_record(Collection::Conversations, &conversation.id, &patch);

        conversation.messages = patch.messages;
        conversation.title = patch.title;
        conversation.updated_at = patch.updated_at;
        outcome
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

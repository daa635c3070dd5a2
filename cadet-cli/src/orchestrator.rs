//! Per-turn answer resolution: remote first, local knowledge on any failure.
//!
//! Turn methods take `&mut self`, so one turn finishes (remote attempt,
//! fallback, state update) before the next can start.

use std::sync::Arc;

use cadet_core::{AdvisoryReply, AdvisoryRequest, LimitSettings, head_chars, tail_chars};
use cadet_knowledge::{KnowledgeStore, fallback_reply};
use tracing::{info, warn};

use crate::availability::{self, AvailabilityState, HINT_FALLBACK, HINT_LOCAL_ONLY};
use crate::client::{AdvisoryChannel, ChannelError};

/// First assistant message of every conversation.
pub const GREETING: &str =
    "Ask me about academies, ROTC, enlistment, Guard/Reserve, and what to do next by grade level.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// Presentation layer callbacks.
pub trait Presenter {
    fn on_message(&mut self, role: Role, text: &str);
    fn on_availability_changed(&mut self, state: &AvailabilityState);
    fn on_continuation_available(&mut self, available: bool);
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Type a question first.")]
    Empty,
}

pub struct Orchestrator<P: Presenter> {
    channel: Arc<dyn AdvisoryChannel>,
    knowledge: Arc<KnowledgeStore>,
    limits: LimitSettings,
    presenter: P,
    availability: AvailabilityState,
    /// Remote text of the current answer and its continuations, capped to
    /// its last `max_prior_chars`.
    history: String,
    continuation_offered: bool,
    /// Set by a NotConfigured failure; never cleared for the session.
    not_configured: bool,
}

impl<P: Presenter> Orchestrator<P> {
    pub fn new(
        channel: Arc<dyn AdvisoryChannel>,
        knowledge: Arc<KnowledgeStore>,
        limits: LimitSettings,
        presenter: P,
    ) -> Self {
        Self {
            channel,
            knowledge,
            limits,
            presenter,
            availability: AvailabilityState::checking(),
            history: String::new(),
            continuation_offered: false,
            not_configured: false,
        }
    }

    /// Greet, then probe the remote channel.
    pub async fn start(&mut self) {
        self.presenter.on_message(Role::Assistant, GREETING);
        self.presenter.on_availability_changed(&self.availability);
        self.probe_availability().await;
    }

    pub fn availability(&self) -> &AvailabilityState {
        &self.availability
    }

    pub fn continuation_available(&self) -> bool {
        self.continuation_offered
    }

    pub fn is_not_configured(&self) -> bool {
        self.not_configured
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Re-check reachability without a content call.
    pub async fn probe_availability(&mut self) -> &AvailabilityState {
        let state = if self.not_configured {
            AvailabilityState::offline(HINT_LOCAL_ONLY, Some(ChannelError::Configuration.class()))
        } else {
            availability::probe(self.channel.as_ref()).await
        };
        self.set_availability(state);
        &self.availability
    }

    /// Accept one user question and emit exactly one reply for it.
    pub async fn submit_question(&mut self, text: &str) -> Result<AdvisoryReply, InputError> {
        let question = text.trim();
        if question.is_empty() {
            return Err(InputError::Empty);
        }

        self.presenter.on_message(Role::User, question);
        self.set_continuation(false);

        let reply = self.resolve(question).await;
        self.presenter.on_message(Role::Assistant, &reply.text);
        Ok(reply)
    }

    /// Resolve a question to a remote answer or local guidance. Never fails.
    pub async fn resolve(&mut self, question: &str) -> AdvisoryReply {
        if !self.not_configured {
            let message = head_chars(question.trim(), self.limits.max_message_chars);
            match self.channel.advise(&AdvisoryRequest::answer(message)).await {
                Ok(reply) => {
                    self.history.clear();
                    self.record_remote(&reply.text);
                    self.set_availability(AvailabilityState::online());
                    self.set_continuation(reply.truncated);
                    return reply;
                }
                Err(e) => {
                    warn!(class = e.class(), "Remote advisory failed; using local knowledge");
                    self.note_failure(&e);
                    self.set_availability(AvailabilityState::offline(
                        HINT_FALLBACK,
                        Some(e.class()),
                    ));
                }
            }
        } else {
            self.set_availability(AvailabilityState::offline(
                HINT_FALLBACK,
                Some(ChannelError::Configuration.class()),
            ));
        }

        let base = self.knowledge.load().await;
        AdvisoryReply::local(fallback_reply(question, &base))
    }

    /// Resume a cut-off answer. Does nothing unless a continuation is offered.
    pub async fn request_continuation(&mut self) -> Option<AdvisoryReply> {
        if !self.continuation_offered || self.not_configured {
            return None;
        }

        let prior = tail_chars(&self.history, self.limits.max_prior_chars).to_string();
        match self.channel.advise(&AdvisoryRequest::continuation(prior)).await {
            Ok(reply) => {
                self.record_remote(&reply.text);
                self.presenter.on_message(Role::Assistant, &reply.text);
                self.set_availability(AvailabilityState::online());
                self.set_continuation(reply.truncated);
                Some(reply)
            }
            Err(e) => {
                warn!(class = e.class(), "Continuation failed");
                self.note_failure(&e);
                self.set_continuation(false);
                self.set_availability(AvailabilityState::offline(
                    HINT_LOCAL_ONLY,
                    Some(e.class()),
                ));
                None
            }
        }
    }

    /// Forget the conversation and greet again. Availability is kept.
    pub fn clear_conversation(&mut self) {
        self.history.clear();
        self.set_continuation(false);
        self.presenter.on_message(Role::Assistant, GREETING);
    }

    fn note_failure(&mut self, err: &ChannelError) {
        if *err == ChannelError::Configuration && !self.not_configured {
            info!("Gateway reports no backend configured; staying local for this session");
            self.not_configured = true;
        }
    }

    fn record_remote(&mut self, text: &str) {
        if !self.history.is_empty() {
            self.history.push('\n');
        }
        self.history.push_str(text);
        let keep = tail_chars(&self.history, self.limits.max_prior_chars);
        if keep.len() != self.history.len() {
            self.history = keep.to_string();
        }
    }

    fn set_availability(&mut self, state: AvailabilityState) {
        self.availability = state;
        self.presenter.on_availability_changed(&self.availability);
    }

    fn set_continuation(&mut self, available: bool) {
        if self.continuation_offered != available {
            self.continuation_offered = available;
            self.presenter.on_continuation_available(available);
        }
    }
}

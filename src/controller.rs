//! The submission state machine.
//!
//! [`SubmissionController`] runs the checks in a fixed order, owns the
//! captcha and rate-limit bookkeeping for one session, talks to the
//! [`Dispatcher`] and publishes every state change as a [`Snapshot`] on a
//! `watch` channel the presentation layer subscribes to.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use rand::RngCore;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::captcha::CaptchaChallenge;
use crate::config::{FailurePolicy, PipelineConfig};
use crate::dispatch::{DispatchReply, Dispatcher};
use crate::form::{ContactMessage, FormData};
use crate::rate_limit::{RateLimiter, SubmissionWindow};
use crate::reset;
use crate::sanitizer::SanitizerPipeline;
use crate::spam::SpamFilter;
use crate::validator::{FieldValidator, RejectReason, ValidationOutcome};

/// What the presentation layer should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Form is editable and submittable.
    Idle,
    /// A submission is being checked or dispatched.
    Sending,
    /// Confirmation is showing; returns to `Idle` after the display delay.
    Sent,
    /// Errors are showing; returns to `Idle` on [`try_again`](SubmissionController::try_again).
    Rejected,
}

/// Everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub state: PipelineState,
    /// Reasons for the current `Rejected` state, empty otherwise.
    pub errors: Vec<RejectReason>,
    pub challenge: CaptchaChallenge,
    /// Bumped whenever the form should be cleared.
    pub form_generation: u64,
}

impl Snapshot {
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// How an accepted submission ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// The dispatcher failed; the user was shown `Sent` anyway and the
    /// fields went to the local fallback log.
    Degraded,
}

/// Result of one [`submit`](SubmissionController::submit) call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The controller was not `Idle`; nothing happened.
    Ignored,
    Rejected(ValidationOutcome),
    Sent(Delivery),
}

pub(crate) struct Session {
    pub(crate) state: PipelineState,
    errors: Vec<RejectReason>,
    challenge: CaptchaChallenge,
    window: SubmissionWindow,
    form_generation: u64,
    /// Identifies the in-flight submission so an abandoned one cannot
    /// settle into a later session state.
    attempt: u64,
    rng: Box<dyn RngCore + Send>,
    reset_task: Option<JoinHandle<()>>,
}

impl Session {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            errors: self.errors.clone(),
            challenge: self.challenge,
            form_generation: self.form_generation,
        }
    }

    fn regenerate_captcha(&mut self) {
        self.challenge = CaptchaChallenge::generate(&mut self.rng);
    }

    fn back_to_idle(&mut self) {
        self.state = PipelineState::Idle;
        self.errors.clear();
        self.regenerate_captcha();
    }

    /// `Sent` -> `Idle` with the form cleared.
    pub(crate) fn clear_after_sent(&mut self) {
        self.back_to_idle();
        self.form_generation += 1;
    }

    fn reject(&mut self, reasons: Vec<RejectReason>) {
        self.state = PipelineState::Rejected;
        self.errors = reasons;
    }

    fn cancel_reset(&mut self) {
        if let Some(task) = self.reset_task.take() {
            task.abort();
        }
    }
}

pub(crate) struct Shared {
    session: Mutex<Session>,
    updates: watch::Sender<Snapshot>,
}

impl Shared {
    pub(crate) fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn publish(&self, session: &Session) {
        self.updates.send_replace(session.snapshot());
    }
}

/// Orchestrates one contact-form session.
///
/// Created by [`ContactFormBuilder::build`](crate::ContactFormBuilder::build).
/// All methods take `&self`; wrap the controller in an [`Arc`] to drive it
/// from several tasks. Only one submission can be in flight: `submit` is
/// ignored unless the state is [`PipelineState::Idle`].
///
/// Must be used inside a Tokio runtime, since a successful submission
/// schedules the auto-clear back to `Idle`. Dropping the controller cancels
/// that task.
pub struct SubmissionController<D: Dispatcher> {
    dispatcher: D,
    config: PipelineConfig,
    validator: FieldValidator,
    sanitizers: SanitizerPipeline,
    spam: SpamFilter,
    limiter: RateLimiter,
    shared: Arc<Shared>,
}

impl<D: Dispatcher> SubmissionController<D> {
    pub(crate) fn new(
        dispatcher: D,
        config: PipelineConfig,
        validator: FieldValidator,
        sanitizers: SanitizerPipeline,
        spam: SpamFilter,
        limiter: RateLimiter,
        mut rng: Box<dyn RngCore + Send>,
    ) -> Self {
        let challenge = CaptchaChallenge::generate(&mut rng);
        let session = Session {
            state: PipelineState::Idle,
            errors: Vec::new(),
            challenge,
            window: SubmissionWindow::default(),
            form_generation: 0,
            attempt: 0,
            rng,
            reset_task: None,
        };
        let (updates, _) = watch::channel(session.snapshot());

        Self {
            dispatcher,
            config,
            validator,
            sanitizers,
            spam,
            limiter,
            shared: Arc::new(Shared {
                session: Mutex::new(session),
                updates,
            }),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn state(&self) -> PipelineState {
        self.shared.lock().state
    }

    /// The captcha the user currently has to solve.
    pub fn challenge(&self) -> CaptchaChallenge {
        self.shared.lock().challenge
    }

    pub fn errors(&self) -> Vec<RejectReason> {
        self.shared.lock().errors.clone()
    }

    /// Current rate-limit bookkeeping.
    pub fn window(&self) -> SubmissionWindow {
        self.shared.lock().window
    }

    /// Submissions counted against the rate limit right now; zero once the
    /// window since the last one has expired.
    pub fn submissions_in_window(&self) -> u32 {
        let window = self.shared.lock().window;
        self.limiter.effective_count(&window, Instant::now())
    }

    pub fn snapshot(&self) -> Snapshot {
        self.shared.lock().snapshot()
    }

    /// Receiver that sees every state change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.shared.updates.subscribe()
    }

    /// Run the full pipeline on `form`.
    ///
    /// Every check runs, so the returned reasons are complete: honeypot,
    /// rate limit, field rules, spam keywords, links. Only an accepted
    /// submission is sanitized, counted against the rate limit and handed
    /// to the dispatcher.
    pub async fn submit(&self, form: FormData) -> SubmitOutcome {
        let now = Instant::now();

        let (attempt, message) = {
            let mut session = self.shared.lock();
            if session.state != PipelineState::Idle {
                tracing::debug!(state = ?session.state, "Submit ignored, controller busy");
                return SubmitOutcome::Ignored;
            }

            session.state = PipelineState::Sending;
            session.errors.clear();
            session.attempt += 1;
            self.shared.publish(&session);

            let outcome = self.check(&form, &session.challenge, &session.window, now);
            if !outcome.is_accepted() {
                tracing::debug!(reasons = ?outcome.messages(), "Submission rejected");
                session.reject(outcome.reasons().to_vec());
                self.shared.publish(&session);
                return SubmitOutcome::Rejected(outcome);
            }

            self.limiter.record(&mut session.window, now);
            (session.attempt, self.sanitize(&form))
        };

        let result = self.dispatch(&message).await;
        if let Err(failure) = &result {
            self.log_fallback(&form, failure);
        }

        let mut session = self.shared.lock();
        if session.attempt != attempt || session.state != PipelineState::Sending {
            tracing::debug!("Dispatch settled after the session moved on, ignoring");
            return SubmitOutcome::Ignored;
        }

        let delivery = match result {
            Ok(reply) => {
                tracing::info!(
                    recipient = %self.config.recipient,
                    "Contact message sent: {}",
                    reply.message
                );
                Delivery::Delivered
            }
            Err(_) if self.config.failure_policy == FailurePolicy::Reject => {
                let outcome = ValidationOutcome::from(vec![RejectReason::DispatchFailed]);
                session.reject(outcome.reasons().to_vec());
                self.shared.publish(&session);
                return SubmitOutcome::Rejected(outcome);
            }
            Err(_) => Delivery::Degraded,
        };

        session.state = PipelineState::Sent;
        session.cancel_reset();
        session.reset_task = Some(reset::schedule(
            Arc::clone(&self.shared),
            self.config.display_delay,
        ));
        self.shared.publish(&session);
        SubmitOutcome::Sent(delivery)
    }

    /// Leave `Rejected` for a fresh attempt. Returns `false` in any other
    /// state.
    pub fn try_again(&self) -> bool {
        let mut session = self.shared.lock();
        if session.state != PipelineState::Rejected {
            return false;
        }
        session.back_to_idle();
        self.shared.publish(&session);
        true
    }

    /// Swap in a new captcha on user request. Only while the form is
    /// visible (`Idle` or `Rejected`).
    pub fn refresh_captcha(&self) -> bool {
        let mut session = self.shared.lock();
        if !matches!(
            session.state,
            PipelineState::Idle | PipelineState::Rejected
        ) {
            return false;
        }
        session.regenerate_captcha();
        self.shared.publish(&session);
        true
    }

    /// Return to `Idle` immediately, e.g. when the user navigates away.
    ///
    /// Cancels a pending auto-clear. A dispatch still in flight keeps
    /// running but its result no longer changes the state.
    pub fn reset(&self) {
        let mut session = self.shared.lock();
        session.cancel_reset();
        match session.state {
            PipelineState::Idle => return,
            PipelineState::Sent => session.clear_after_sent(),
            PipelineState::Sending => {
                session.attempt += 1;
                session.back_to_idle();
            }
            PipelineState::Rejected => session.back_to_idle(),
        }
        self.shared.publish(&session);
    }

    fn check(
        &self,
        form: &FormData,
        challenge: &CaptchaChallenge,
        window: &SubmissionWindow,
        now: Instant,
    ) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::new();
        outcome.check(!form.honeypot.is_empty(), RejectReason::Honeypot);
        outcome.check(
            !self.limiter.permit(window, now),
            RejectReason::RateLimited,
        );
        outcome.extend(self.validator.validate(form, challenge).into_reasons());
        if let Some(keyword) = self.spam.matched_keyword(&form.message) {
            tracing::debug!(keyword, "Spam keyword matched");
            outcome.push(RejectReason::Spam);
        }
        outcome.check(contains_link(&form.message), RejectReason::Link);
        outcome
    }

    fn sanitize(&self, form: &FormData) -> ContactMessage {
        ContactMessage {
            name: self.sanitizers.sanitize(&form.name),
            email: self.sanitizers.sanitize(&form.email),
            subject: self.sanitizers.sanitize(&form.subject),
            message: self.sanitizers.sanitize(&form.message),
        }
    }

    /// Any `Err`, unsuccessful reply or panic counts as a failure.
    async fn dispatch(&self, message: &ContactMessage) -> Result<DispatchReply, String> {
        match AssertUnwindSafe(self.dispatcher.send(message))
            .catch_unwind()
            .await
        {
            Ok(Ok(reply)) if reply.success => Ok(reply),
            Ok(Ok(reply)) => Err(reply.message),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err("dispatcher panicked".to_string()),
        }
    }

    fn log_fallback(&self, form: &FormData, failure: &str) {
        tracing::error!("Error sending contact message: {failure}");
        tracing::warn!(
            name = %form.name,
            email = %form.email,
            subject = %form.subject,
            message = %form.message,
            target_email = %self.config.recipient,
            "Contact form submission kept for manual follow-up"
        );
    }
}

impl<D: Dispatcher> Drop for SubmissionController<D> {
    fn drop(&mut self) {
        self.shared.lock().cancel_reset();
    }
}

/// URL injection check, separate from keyword spam. Matches the lowercase
/// schemes only.
fn contains_link(message: &str) -> bool {
    message.contains("http://") || message.contains("https://")
}

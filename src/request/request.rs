//! The booking request context.

use super::error::RequestError;
use super::states::{BookingRequestState, Created, RequestStage, RequestStep};
use crate::clock::{Clock, SystemClock};
use crate::core::{Journal, State, StateHistory, StateTransition, Step};
use crate::enforcement::{EnforcementBuilder, EnforcementRules, ViolationStrategy};
use crate::feedback::Feedback;
use crate::money::Amount;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Default time a client has to pay once a request is sent.
pub const DEFAULT_PAYMENT_WINDOW_SECS: i64 = 300;

/// Knobs for a new request.
#[derive(Clone)]
pub struct RequestOptions {
    pub window: Duration,
    pub clock: Arc<dyn Clock>,
    /// What a late payment does
    pub on_expired: ViolationStrategy,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            window: Duration::seconds(DEFAULT_PAYMENT_WINDOW_SECS),
            clock: Arc::new(SystemClock),
            on_expired: ViolationStrategy::Abort,
        }
    }
}

/// Data shared by the request stages.
pub struct RequestDetails {
    pub(crate) id: String,
    pub(crate) client: String,
    pub(crate) price: Amount,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) sent_at: Option<DateTime<Utc>>,
    pub(crate) deadline: Option<DateTime<Utc>>,
    pub(crate) window: Duration,
    pub(crate) journal: Journal,
    pub(crate) rules: EnforcementRules<RequestStage>,
    clock: Arc<dyn Clock>,
}

impl RequestDetails {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn client(&self) -> &str {
        &self.client
    }

    pub fn price(&self) -> Amount {
        self.price
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn note(&mut self, message: impl Into<String>) {
        let at = self.clock.now();
        self.journal.note(at, message);
    }
}

/// Short request id: the first eight hex digits of a v4 UUID, uppercased.
fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id.to_uppercase()
}

/// A ticket booking request with a payment deadline.
///
/// # Example
///
/// ```rust
/// use patternworks::clock::ManualClock;
/// use patternworks::feedback::Transcript;
/// use patternworks::money::Amount;
/// use patternworks::request::{BookingRequest, RequestOptions, RequestStage};
/// use std::sync::Arc;
///
/// let clock = Arc::new(ManualClock::starting_now());
/// let options = RequestOptions { clock: clock.clone(), ..RequestOptions::default() };
/// let mut request =
///     BookingRequest::new("Alice", Amount::from_units(1200), options, Transcript::new()).unwrap();
///
/// request.send_to_client().unwrap();
/// clock.advance(chrono::Duration::minutes(6));
/// request.pay().unwrap();
///
/// assert_eq!(request.stage(), RequestStage::Cancelled);
/// ```
pub struct BookingRequest<F: Feedback> {
    state: Box<dyn BookingRequestState>,
    details: RequestDetails,
    history: StateHistory<RequestStage>,
    out: F,
}

impl<F: Feedback> BookingRequest<F> {
    pub fn new(
        client: impl Into<String>,
        price: Amount,
        options: RequestOptions,
        out: F,
    ) -> Result<Self, RequestError> {
        let client = client.into().trim().to_string();
        if client.is_empty() {
            return Err(RequestError::BlankClient);
        }
        if !price.is_positive() {
            return Err(RequestError::InvalidPrice(price));
        }

        let window_std = options
            .window
            .to_std()
            .ok()
            .filter(|window| !window.is_zero())
            .ok_or(RequestError::InvalidWindow {
                window: options.window,
            })?;
        let rules = EnforcementBuilder::new()
            .deadline(window_std)
            .on_violation(options.on_expired)
            .build();

        let created_at = options.clock.now();
        let mut details = RequestDetails {
            id: short_id(),
            client,
            price,
            created_at,
            sent_at: None,
            deadline: None,
            window: options.window,
            journal: Journal::new(),
            rules,
            clock: options.clock,
        };
        details.note(format!("request created for {}", details.client));
        tracing::info!(request = %details.id, client = %details.client, price = %details.price, "request created");

        Ok(Self {
            state: Box::new(Created),
            details,
            history: StateHistory::new(),
            out,
        })
    }

    /// Send the request and start the payment window.
    pub fn send_to_client(&mut self) -> Result<(), RequestError> {
        let step = self.state.send_to_client(&mut self.details, &mut self.out);
        self.commit("send_to_client", step)
    }

    /// Pay the ticket price. A payment after the deadline cancels the
    /// request instead (unless configured otherwise).
    pub fn pay(&mut self) -> Result<(), RequestError> {
        let step = self.state.pay(&mut self.details, &mut self.out);
        self.commit("pay", step)
    }

    pub fn confirm(&mut self) -> Result<(), RequestError> {
        let step = self.state.confirm(&mut self.details, &mut self.out);
        self.commit("confirm", step)
    }

    pub fn cancel(&mut self) -> Result<(), RequestError> {
        let step = self.state.cancel(&mut self.details, &mut self.out);
        self.commit("cancel", step)
    }

    /// Whether a deadline is set and has passed.
    pub fn is_payment_expired(&self) -> bool {
        self.details
            .deadline
            .is_some_and(|deadline| self.details.now() > deadline)
    }

    /// Time left to pay; `None` before the request is sent.
    pub fn time_remaining(&self) -> Option<Duration> {
        self.details
            .deadline
            .map(|deadline| (deadline - self.details.now()).max(Duration::zero()))
    }

    pub fn stage(&self) -> RequestStage {
        self.state.stage()
    }

    pub fn id(&self) -> &str {
        &self.details.id
    }

    pub fn details(&self) -> &RequestDetails {
        &self.details
    }

    pub fn history(&self) -> &StateHistory<RequestStage> {
        &self.history
    }

    pub fn journal(&self) -> &Journal {
        &self.details.journal
    }

    pub fn feedback(&self) -> &F {
        &self.out
    }

    /// Describe the deadline in human terms.
    pub fn deadline_status(&self) -> String {
        match self.time_remaining() {
            None => "No payment deadline yet. Send the request first.".to_string(),
            Some(_) if self.is_payment_expired() => {
                "Payment deadline passed. Paying now cancels the request.".to_string()
            }
            Some(left) => format!(
                "{} min {} sec left to pay",
                left.num_minutes(),
                left.num_seconds() % 60
            ),
        }
    }

    fn commit(
        &mut self,
        action: &'static str,
        step: Result<RequestStep, RequestError>,
    ) -> Result<(), RequestError> {
        match step {
            Ok(Step::Stay) => Ok(()),
            Ok(Step::Enter(next)) | Ok(Step::Reroute(next)) => {
                let from = self.state.stage();
                let to = next.stage();
                self.history = self.history.record(StateTransition {
                    from,
                    to,
                    action: action.to_string(),
                    timestamp: self.details.now(),
                });
                self.details.note(format!("entered {to}"));
                tracing::debug!(machine = "request", request = %self.details.id, from = from.name(), to = to.name(), action, "transition");
                self.state = next;
                Ok(())
            }
            Err(error) => {
                tracing::warn!(machine = "request", stage = %self.state.stage(), action, %error, "action refused");
                Err(error)
            }
        }
    }
}

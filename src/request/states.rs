//! Stage handlers of a booking request.

use super::error::RequestError;
use super::request::RequestDetails;
use crate::core::Step;
use crate::enforcement::{TransitionContext, ViolationStrategy};
use crate::feedback::Feedback;
use stillwater::validation::Validation;

state_enum! {
    pub enum RequestStage {
        Created,
        WaitingForPayment,
        Paid,
        Confirmed,
        Cancelled,
    }
    final: [Confirmed, Cancelled]
    error: [Cancelled]
}

pub type RequestStep = Step<dyn BookingRequestState>;

/// Behavior of one request stage.
pub trait BookingRequestState: Send + Sync {
    fn stage(&self) -> RequestStage;

    fn send_to_client(
        &self,
        ctx: &mut RequestDetails,
        out: &mut dyn Feedback,
    ) -> Result<RequestStep, RequestError>;

    fn pay(&self, ctx: &mut RequestDetails, out: &mut dyn Feedback)
        -> Result<RequestStep, RequestError>;

    fn confirm(
        &self,
        ctx: &mut RequestDetails,
        out: &mut dyn Feedback,
    ) -> Result<RequestStep, RequestError>;

    fn cancel(
        &self,
        ctx: &mut RequestDetails,
        out: &mut dyn Feedback,
    ) -> Result<RequestStep, RequestError>;
}

fn refuse(
    stage: RequestStage,
    action: &'static str,
    hint: &'static str,
) -> Result<RequestStep, RequestError> {
    Err(RequestError::NotAllowed {
        action,
        stage,
        hint,
    })
}

fn stay_with(out: &mut dyn Feedback, line: &str) -> Result<RequestStep, RequestError> {
    out.say(line);
    Ok(Step::Stay)
}

/// Drafted, not yet sent.
#[derive(Debug, Clone, Copy)]
pub struct Created;

impl BookingRequestState for Created {
    fn stage(&self) -> RequestStage {
        RequestStage::Created
    }

    fn send_to_client(
        &self,
        ctx: &mut RequestDetails,
        out: &mut dyn Feedback,
    ) -> Result<RequestStep, RequestError> {
        let now = ctx.now();
        let deadline = now
            .checked_add_signed(ctx.window)
            .ok_or(RequestError::InvalidWindow { window: ctx.window })?;
        ctx.sent_at = Some(now);
        ctx.deadline = Some(deadline);

        out.say(&format!("Request {} sent to {}", ctx.id, ctx.client));
        out.say(&format!("Pay before {}", deadline.format("%H:%M:%S")));
        ctx.note(format!(
            "sent to client, payment window {} min",
            ctx.window.num_minutes()
        ));
        Ok(Step::Enter(Box::new(WaitingForPayment)))
    }

    fn pay(
        &self,
        _ctx: &mut RequestDetails,
        _out: &mut dyn Feedback,
    ) -> Result<RequestStep, RequestError> {
        refuse(self.stage(), "pay", "send the request to the client first")
    }

    fn confirm(
        &self,
        _ctx: &mut RequestDetails,
        _out: &mut dyn Feedback,
    ) -> Result<RequestStep, RequestError> {
        refuse(self.stage(), "confirm", "the request must be paid first")
    }

    fn cancel(
        &self,
        ctx: &mut RequestDetails,
        out: &mut dyn Feedback,
    ) -> Result<RequestStep, RequestError> {
        out.say(&format!("Request {} cancelled before sending.", ctx.id));
        ctx.note("cancelled after creation");
        Ok(Step::Enter(Box::new(Cancelled)))
    }
}

/// Sent; the payment window is running.
#[derive(Debug, Clone, Copy)]
pub struct WaitingForPayment;

impl BookingRequestState for WaitingForPayment {
    fn stage(&self) -> RequestStage {
        RequestStage::WaitingForPayment
    }

    fn send_to_client(
        &self,
        _ctx: &mut RequestDetails,
        out: &mut dyn Feedback,
    ) -> Result<RequestStep, RequestError> {
        stay_with(out, "Request was already sent to the client.")
    }

    fn pay(
        &self,
        ctx: &mut RequestDetails,
        out: &mut dyn Feedback,
    ) -> Result<RequestStep, RequestError> {
        let now = ctx.now();
        let started_at = ctx.sent_at.unwrap_or(ctx.created_at);
        let check = TransitionContext {
            from: RequestStage::WaitingForPayment,
            to: RequestStage::Paid,
            started_at,
            now,
        };

        if let Validation::Failure(violations) = ctx.rules.enforce(&check) {
            let reasons: Vec<String> = violations.iter().map(ToString::to_string).collect();
            match ctx.rules.violation_strategy() {
                ViolationStrategy::Abort => {
                    out.say("Payment window expired. Request cancelled automatically.");
                    ctx.note("payment window expired, cancelled automatically");
                    tracing::info!(request = %ctx.id, ?reasons, "request aborted");
                    return Ok(Step::Enter(Box::new(Cancelled)));
                }
                ViolationStrategy::Reject => {
                    return Err(RequestError::PaymentExpired {
                        deadline: ctx.deadline.unwrap_or(now),
                    });
                }
                ViolationStrategy::IgnoreAndLog => {
                    tracing::warn!(request = %ctx.id, ?reasons, "late payment accepted");
                }
            }
        }

        out.say(&format!("Payment received: {}", ctx.price));
        out.say(&format!("Ticket paid by {}", ctx.client));
        ctx.note(format!("payment received: {}", ctx.price));
        Ok(Step::Enter(Box::new(Paid)))
    }

    fn confirm(
        &self,
        _ctx: &mut RequestDetails,
        _out: &mut dyn Feedback,
    ) -> Result<RequestStep, RequestError> {
        refuse(self.stage(), "confirm", "payment has not been received")
    }

    fn cancel(
        &self,
        ctx: &mut RequestDetails,
        out: &mut dyn Feedback,
    ) -> Result<RequestStep, RequestError> {
        out.say(&format!("Request {} cancelled. The client did not pay.", ctx.id));
        ctx.note("cancelled, client did not pay");
        Ok(Step::Enter(Box::new(Cancelled)))
    }
}

/// Paid, awaiting confirmation.
#[derive(Debug, Clone, Copy)]
pub struct Paid;

impl BookingRequestState for Paid {
    fn stage(&self) -> RequestStage {
        RequestStage::Paid
    }

    fn send_to_client(
        &self,
        _ctx: &mut RequestDetails,
        out: &mut dyn Feedback,
    ) -> Result<RequestStep, RequestError> {
        stay_with(out, "Request is already paid.")
    }

    fn pay(
        &self,
        _ctx: &mut RequestDetails,
        out: &mut dyn Feedback,
    ) -> Result<RequestStep, RequestError> {
        stay_with(out, "Request is already paid.")
    }

    fn confirm(
        &self,
        ctx: &mut RequestDetails,
        out: &mut dyn Feedback,
    ) -> Result<RequestStep, RequestError> {
        out.say("Booking confirmed.");
        out.say(&format!("Ticket for {} booked under {}", ctx.client, ctx.id));
        ctx.note("booking confirmed");
        Ok(Step::Enter(Box::new(Confirmed)))
    }

    fn cancel(
        &self,
        _ctx: &mut RequestDetails,
        _out: &mut dyn Feedback,
    ) -> Result<RequestStep, RequestError> {
        refuse(
            self.stage(),
            "cancel",
            "the request is paid; an administrator must issue the refund",
        )
    }
}

/// Confirmed. Final.
#[derive(Debug, Clone, Copy)]
pub struct Confirmed;

impl BookingRequestState for Confirmed {
    fn stage(&self) -> RequestStage {
        RequestStage::Confirmed
    }

    fn send_to_client(
        &self,
        _ctx: &mut RequestDetails,
        out: &mut dyn Feedback,
    ) -> Result<RequestStep, RequestError> {
        stay_with(out, "Booking is already confirmed.")
    }

    fn pay(
        &self,
        _ctx: &mut RequestDetails,
        out: &mut dyn Feedback,
    ) -> Result<RequestStep, RequestError> {
        stay_with(out, "Payment was already received.")
    }

    fn confirm(
        &self,
        _ctx: &mut RequestDetails,
        out: &mut dyn Feedback,
    ) -> Result<RequestStep, RequestError> {
        stay_with(out, "Booking is already confirmed.")
    }

    fn cancel(
        &self,
        _ctx: &mut RequestDetails,
        _out: &mut dyn Feedback,
    ) -> Result<RequestStep, RequestError> {
        refuse(self.stage(), "cancel", "contact an administrator")
    }
}

/// Cancelled. Final.
#[derive(Debug, Clone, Copy)]
pub struct Cancelled;

impl BookingRequestState for Cancelled {
    fn stage(&self) -> RequestStage {
        RequestStage::Cancelled
    }

    fn send_to_client(
        &self,
        _ctx: &mut RequestDetails,
        _out: &mut dyn Feedback,
    ) -> Result<RequestStep, RequestError> {
        refuse(self.stage(), "send", "the request was cancelled")
    }

    fn pay(
        &self,
        _ctx: &mut RequestDetails,
        _out: &mut dyn Feedback,
    ) -> Result<RequestStep, RequestError> {
        refuse(self.stage(), "pay", "the request was cancelled")
    }

    fn confirm(
        &self,
        _ctx: &mut RequestDetails,
        _out: &mut dyn Feedback,
    ) -> Result<RequestStep, RequestError> {
        refuse(self.stage(), "confirm", "the request was cancelled")
    }

    fn cancel(
        &self,
        _ctx: &mut RequestDetails,
        out: &mut dyn Feedback,
    ) -> Result<RequestStep, RequestError> {
        stay_with(out, "Request is already cancelled.")
    }
}

//! Widget session lifecycle.
//!
//! A [`Session`] owns the collected inputs, the last applied output, and the
//! user-visible status for one blueprint. Network round-trips go through an
//! [`InferenceTransport`]; the session itself only changes inside `&mut self`
//! methods, so a front-end that runs several predictions concurrently splits
//! them into [`Session::begin_invoke`] and [`Session::complete_invoke`].
//! Completions are sequenced by request id: only the most recently issued
//! request may replace the output.

use std::fmt;
use std::sync::Arc;

use hudl_api::{InferenceTransport, TransportError};
use hudl_types::{Blueprint, OutputDescriptor};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::collector::{CollectError, CollectedInputs};
use crate::mapper::project_output;
use crate::payload::build_payload;

/// Generic message surfaced when a prediction fails.
pub const FAILURE_NOTICE: &str = "Something went wrong! Please try again.";

/// User-visible readiness of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// Nothing has been sent yet.
    #[default]
    Idle,
    /// The readiness probe is in flight.
    Probing,
    /// At least one prediction is in flight.
    Inferring,
    /// Ready for input. Failures also settle here.
    Ready,
}

impl SessionStatus {
    /// Status line shown to the user.
    pub fn message(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "Waiting for input",
            SessionStatus::Probing => "Loading Model into Memory...",
            SessionStatus::Inferring => "The model is performing inference",
            SessionStatus::Ready => "⚡ Model is Ready",
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, SessionStatus::Probing | SessionStatus::Inferring)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Things that happened during a session, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StatusChanged { from: SessionStatus, to: SessionStatus },
    ProbeFailed { error: TransportError },
    /// A user-visible notice was raised.
    Notice { message: String },
    ResponseApplied { request_id: u64 },
    StaleResponseDiscarded { request_id: u64, latest: u64 },
}

/// Event log accumulated by a session.
#[derive(Debug, Default, Clone)]
pub struct SessionTelemetry {
    events: Vec<SessionEvent>,
}

impl SessionTelemetry {
    fn record(&mut self, event: SessionEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }

    /// Notices raised so far, oldest first.
    pub fn notices(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SessionEvent::Notice { message } => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Take every recorded event, leaving the log empty.
    pub fn drain(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }
}

/// A prediction that has been issued but not yet completed.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingInvocation {
    pub request_id: u64,
    pub payload: Value,
}

/// How a completed prediction affected the session.
#[derive(Debug, Clone, PartialEq)]
pub enum InvokeOutcome {
    /// The response replaced the output.
    Applied { request_id: u64 },
    /// The request failed; the previous output was kept.
    Failed { request_id: u64, notice: String },
    /// A newer request was issued after this one; its result was dropped.
    Superseded { request_id: u64, latest: u64 },
}

/// An output descriptor paired with the value it should render.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputView<'a> {
    pub descriptor: &'a OutputDescriptor,
    pub value: Option<Value>,
}

#[derive(Debug)]
pub struct Session {
    blueprint: Arc<Blueprint>,
    inputs: CollectedInputs,
    output: Option<Value>,
    status: SessionStatus,
    next_request_id: u64,
    latest_issued: Option<u64>,
    in_flight: usize,
    telemetry: SessionTelemetry,
}

impl Session {
    /// Start a session with inputs seeded from the blueprint's examples.
    pub fn new(blueprint: Arc<Blueprint>) -> Result<Self, CollectError> {
        let inputs = CollectedInputs::seeded(&blueprint)?;
        Ok(Self {
            blueprint,
            inputs,
            output: None,
            status: SessionStatus::Idle,
            next_request_id: 1,
            latest_issued: None,
            in_flight: 0,
            telemetry: SessionTelemetry::default(),
        })
    }

    pub fn blueprint(&self) -> &Blueprint {
        &self.blueprint
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn inputs(&self) -> &CollectedInputs {
        &self.inputs
    }

    /// Mutable access for editors that record through [`CollectedInputs`] directly.
    pub fn inputs_mut(&mut self) -> &mut CollectedInputs {
        &mut self.inputs
    }

    /// The last applied raw output.
    pub fn output(&self) -> Option<&Value> {
        self.output.as_ref()
    }

    pub fn telemetry(&self) -> &SessionTelemetry {
        &self.telemetry
    }

    pub fn telemetry_mut(&mut self) -> &mut SessionTelemetry {
        &mut self.telemetry
    }

    /// Record a value for the input with id `input_id`.
    pub fn record(&mut self, input_id: &str, value: Value) -> Result<(), CollectError> {
        let descriptor = self
            .blueprint
            .input(input_id)
            .ok_or_else(|| CollectError::unknown_input(input_id))?;
        self.inputs.record(descriptor, value)
    }

    /// The payload the next prediction would send.
    pub fn payload(&self) -> Value {
        build_payload(&self.blueprint, &self.inputs)
    }

    /// Best-effort readiness call. Failures are logged and never surfaced.
    pub async fn probe(&mut self, transport: &dyn InferenceTransport) {
        self.set_status(SessionStatus::Probing);
        match transport.probe().await {
            Ok(body) => debug!(body = %body, "probe succeeded"),
            Err(error) => {
                warn!(%error, "probe failed");
                self.telemetry.record(SessionEvent::ProbeFailed { error });
            }
        }
        self.settle();
    }

    /// Issue a new request id and build its payload.
    pub fn begin_invoke(&mut self) -> PendingInvocation {
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.latest_issued = Some(request_id);
        self.in_flight += 1;
        self.set_status(SessionStatus::Inferring);
        let payload = self.payload();
        debug!(request_id, in_flight = self.in_flight, "prediction issued");
        PendingInvocation { request_id, payload }
    }

    /// Apply the result of a request issued by [`Session::begin_invoke`].
    pub fn complete_invoke(&mut self, request_id: u64, result: Result<Value, TransportError>) -> InvokeOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);
        let latest = self.latest_issued.unwrap_or(request_id);

        let outcome = if request_id != latest {
            info!(request_id, latest, "discarding stale prediction result");
            self.telemetry.record(SessionEvent::StaleResponseDiscarded { request_id, latest });
            InvokeOutcome::Superseded { request_id, latest }
        } else {
            match result {
                Ok(output) => {
                    self.output = Some(output);
                    self.telemetry.record(SessionEvent::ResponseApplied { request_id });
                    InvokeOutcome::Applied { request_id }
                }
                Err(error) => {
                    warn!(request_id, %error, "prediction failed");
                    self.telemetry.record(SessionEvent::Notice {
                        message: FAILURE_NOTICE.to_string(),
                    });
                    InvokeOutcome::Failed {
                        request_id,
                        notice: FAILURE_NOTICE.to_string(),
                    }
                }
            }
        };

        self.settle();
        outcome
    }

    /// Send the current payload and apply the result.
    pub async fn invoke(&mut self, transport: &dyn InferenceTransport) -> InvokeOutcome {
        let pending = self.begin_invoke();
        let result = transport.predict(&pending.payload).await;
        self.complete_invoke(pending.request_id, result)
    }

    /// Mapped values for every output, or `None` before any response was applied.
    pub fn rendered_outputs(&self) -> Option<Vec<OutputView<'_>>> {
        let raw = self.output.as_ref()?;
        Some(
            self.blueprint
                .outputs
                .iter()
                .map(|descriptor| OutputView {
                    descriptor,
                    value: project_output(descriptor, raw),
                })
                .collect(),
        )
    }

    /// Leave the busy state: `Ready` when nothing is in flight, `Inferring` otherwise.
    fn settle(&mut self) {
        if self.in_flight == 0 {
            self.set_status(SessionStatus::Ready);
        } else {
            self.set_status(SessionStatus::Inferring);
        }
    }

    fn set_status(&mut self, to: SessionStatus) {
        let from = self.status;
        if from == to {
            return;
        }
        self.status = to;
        debug!(%from, %to, "session status changed");
        self.telemetry.record(SessionEvent::StatusChanged { from, to });
    }
}

// Request tokens - busy guard, cancellation and stale response detection
use crate::error::{PipelineError, RequestKind};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct InFlight {
    token: RequestToken,
    task: Option<JoinHandle<()>>,
}

/// Tracks the single outstanding request of one kind.
///
/// Tokens increase monotonically; only a completion carrying the token of the request
/// currently in flight may be applied.
#[derive(Debug)]
pub struct RequestTracker {
    kind: RequestKind,
    last_issued: u64,
    in_flight: Option<InFlight>,
}

impl RequestTracker {
    pub fn new(kind: RequestKind) -> Self {
        Self {
            kind,
            last_issued: 0,
            in_flight: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Issue a token, refusing while another request of this kind is outstanding
    pub fn begin(&mut self) -> Result<RequestToken, PipelineError> {
        if self.is_busy() {
            return Err(PipelineError::Busy(self.kind));
        }
        self.last_issued += 1;
        let token = RequestToken(self.last_issued);
        self.in_flight = Some(InFlight { token, task: None });
        Ok(token)
    }

    pub fn attach(&mut self, token: RequestToken, task: JoinHandle<()>) {
        match self.in_flight.as_mut() {
            Some(in_flight) if in_flight.token == token => in_flight.task = Some(task),
            _ => task.abort(),
        }
    }

    /// Abort the outstanding request; its response will be treated as stale
    pub fn invalidate(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            tracing::debug!(
                "Invalidating {} request (token {})",
                self.kind,
                in_flight.token.value()
            );
            if let Some(task) = in_flight.task {
                task.abort();
            }
        }
    }

    /// Accept a completion only if it answers the request currently in flight
    pub fn complete(&mut self, token: RequestToken) -> Result<(), PipelineError> {
        match &self.in_flight {
            Some(in_flight) if in_flight.token == token => {
                self.in_flight = None;
                Ok(())
            }
            _ => Err(PipelineError::StaleResponse {
                kind: self.kind,
                token: token.value(),
            }),
        }
    }
}

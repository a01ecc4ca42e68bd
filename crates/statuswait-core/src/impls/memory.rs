//! In-memory source and sink for tests and local experiments.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::{Outcome, PollEvent, SinkError, SourceError, StatusRecord};
use crate::ports::{EventSink, StatusSource};

type Response = Result<Vec<StatusRecord>, SourceError>;

/// Replays a fixed list of responses, one per fetch.
///
/// The last response repeats once the script runs out; an empty script always
/// answers with an empty list.
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Response>>,
    calls: AtomicU32,
}

impl ScriptedSource {
    pub fn new(responses: impl IntoIterator<Item = Response>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: AtomicU32::new(0),
        }
    }

    /// One single-entry response per state, all for `context`.
    pub fn states(context: &str, states: &[&str]) -> Self {
        Self::new(
            states
                .iter()
                .map(|state| -> Response { Ok(vec![StatusRecord::new(context, *state)]) }),
        )
    }

    /// Number of fetches served so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl StatusSource for ScriptedSource {
    async fn fetch(&self, _reference: &str) -> Result<Vec<StatusRecord>, SourceError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        let mut responses = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if responses.len() > 1
            && let Some(response) = responses.pop_front()
        {
            return response;
        }
        responses.front().cloned().unwrap_or_else(|| Ok(Vec::new()))
    }

    fn endpoint(&self, reference: &str) -> String {
        format!("memory://statuses/{reference}")
    }
}

/// Keeps every event and published outcome.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<PollEvent>>,
    published: Mutex<Vec<Outcome>>,
    fail_records: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose `record` always errors (events are still kept).
    pub fn failing() -> Self {
        Self {
            fail_records: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<PollEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events().iter().map(PollEvent::message).collect()
    }

    pub fn published(&self) -> Vec<Outcome> {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: &PollEvent) -> Result<(), SinkError> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
        if self.fail_records {
            return Err(SinkError::Terminal(io::Error::other("sink closed")));
        }
        Ok(())
    }

    fn publish(&self, outcome: Outcome) -> Result<(), SinkError> {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(outcome);
        Ok(())
    }
}

//! Owns the session state and runs the fetch side effects.
//!
//! Events are applied one at a time on the caller's task. Fetches run on
//! spawned tasks and report back through the dispatcher; their results are
//! applied later via [`InputController::apply`], where the reducer drops any
//! result whose accession is no longer in the map.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::sequence::{Accession, SequenceRecord};
use crate::state::{plan_input, Event, InputState, PatternState, State, FETCH_FAILED_MESSAGE};

/// Source of sequence records, e.g. the UniProt REST API.
#[async_trait]
pub trait SequenceFetcher: Send + Sync {
    async fn fetch_sequence(&self, accession: &Accession) -> Result<SequenceRecord>;
}

/// Sink for events produced by fetch tasks.
pub type Dispatch = Arc<dyn Fn(Event) + Send + Sync>;

pub struct InputController {
    state: State,
    fetcher: Arc<dyn SequenceFetcher>,
    dispatch: Dispatch,
}

impl InputController {
    pub fn new(fetcher: Arc<dyn SequenceFetcher>, dispatch: Dispatch) -> Self {
        Self {
            state: State::default(),
            fetcher,
            dispatch,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn input(&self) -> &InputState {
        &self.state.input
    }

    pub fn pattern(&self) -> &PatternState {
        &self.state.pattern
    }

    /// Apply an event to the current state.
    pub fn apply(&mut self, event: Event) {
        if let Some(accession) = self.stale_accession(&event) {
            warn!(accession = %accession, "Discarding fetch result for removed accession");
        }
        self.state = self.state.reduce(event);
    }

    /// The accession of a fetch result that no longer has an entry.
    fn stale_accession<'e>(&self, event: &'e Event) -> Option<&'e Accession> {
        let accession = match event {
            Event::ProteinFetched(record) => &record.accession,
            Event::ProteinFetchFailed { accession, .. } => accession,
            Event::PatternChanged(_) | Event::InputChanged(_) => return None,
        };
        (!self.state.input.fastas().contains_key(accession)).then_some(accession)
    }

    pub fn change_pattern(&mut self, text: &str) {
        self.apply(Event::PatternChanged(text.to_string()));
        if let Some(err) = &self.state.pattern.error {
            debug!(pattern = text, error = %err, "Pattern did not compile");
        }
    }

    /// Re-derive the committed accessions from raw editor text and start a
    /// fetch for each one not already known.
    pub fn change_input(&mut self, raw: &str) {
        let plan = plan_input(&self.state.input, raw);
        debug!(
            committed = plan.input.fastas().len(),
            fresh = plan.fresh.len(),
            "Input changed"
        );
        self.apply(Event::InputChanged(plan.input));

        for accession in plan.fresh {
            self.spawn_fetch(accession);
        }
    }

    fn spawn_fetch(&self, accession: Accession) {
        let fetcher = Arc::clone(&self.fetcher);
        let dispatch = Arc::clone(&self.dispatch);

        tokio::spawn(async move {
            let event = match fetcher.fetch_sequence(&accession).await {
                Ok(record) if record.accession == accession => {
                    info!(accession = %accession, residues = record.sequence.len(), "Sequence fetched");
                    Event::ProteinFetched(record)
                }
                Ok(record) => {
                    warn!(
                        requested = %accession,
                        received = %record.accession,
                        "Fetched record is for a different accession"
                    );
                    Event::ProteinFetchFailed {
                        accession,
                        message: FETCH_FAILED_MESSAGE.to_string(),
                    }
                }
                Err(e) => {
                    warn!(accession = %accession, error = %e, "Sequence fetch failed");
                    Event::ProteinFetchFailed {
                        accession,
                        message: FETCH_FAILED_MESSAGE.to_string(),
                    }
                }
            };
            dispatch(event);
        });
    }
}

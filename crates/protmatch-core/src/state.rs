//! Session state and the pure reducer that folds events into it.
//!
//! The reducer never performs I/O. Deciding which accessions need fetching
//! happens in [`plan_input`]; spawning the fetches is the controller's job.

use regex::Regex;
use std::sync::Arc;

use crate::ordered_map::OrderedMap;
use crate::sequence::{self, Accession, MatchSet, SequenceRecord};

/// Message stored for every accession whose fetch did not produce a record.
pub const FETCH_FAILED_MESSAGE: &str = "failed to load";

/// Lifecycle of one accession's record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    Loading,
    Error { message: String },
    Ok(MatchSet),
}

impl FetchState {
    /// Number of pattern matches, once the record is loaded.
    pub fn match_count(&self) -> Option<usize> {
        match self {
            FetchState::Ok(set) => Some(set.matches.len()),
            FetchState::Loading | FetchState::Error { .. } => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }
}

pub type Fastas = OrderedMap<Accession, FetchState>;

/// Committed accessions, plus the partially typed trailing line if any.
#[derive(Debug, Clone, PartialEq)]
pub enum InputState {
    Complete { fastas: Fastas },
    Incomplete { fastas: Fastas, rest: String },
}

impl Default for InputState {
    fn default() -> Self {
        InputState::Incomplete {
            fastas: Fastas::new(),
            rest: String::new(),
        }
    }
}

impl InputState {
    pub fn fastas(&self) -> &Fastas {
        match self {
            InputState::Complete { fastas } | InputState::Incomplete { fastas, .. } => fastas,
        }
    }

    fn with_fastas(&self, fastas: Fastas) -> InputState {
        match self {
            InputState::Complete { .. } => InputState::Complete { fastas },
            InputState::Incomplete { rest, .. } => InputState::Incomplete {
                fastas,
                rest: rest.clone(),
            },
        }
    }

    /// The editable text this state renders back to.
    pub fn text(&self) -> String {
        let keys: Vec<String> = self
            .fastas()
            .keys()
            .into_iter()
            .map(|k| k.as_str().to_string())
            .collect();
        match self {
            InputState::Complete { .. } => {
                let mut text = keys.join("\n");
                if !keys.is_empty() {
                    text.push('\n');
                }
                text
            }
            InputState::Incomplete { rest, .. } => {
                let mut lines = keys;
                lines.push(rest.clone());
                lines.join("\n")
            }
        }
    }
}

/// The active search pattern.
///
/// An empty input means no pattern. An input that fails to compile also
/// leaves `regex` empty and records the compiler message in `error`.
#[derive(Debug, Clone, Default)]
pub struct PatternState {
    pub input: String,
    pub regex: Option<Regex>,
    pub error: Option<String>,
}

impl PatternState {
    pub fn compile(input: &str) -> Self {
        if input.is_empty() {
            return Self::default();
        }
        match Regex::new(input) {
            Ok(regex) => Self {
                input: input.to_string(),
                regex: Some(regex),
                error: None,
            },
            Err(e) => Self {
                input: input.to_string(),
                regex: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct State {
    pub input: InputState,
    pub pattern: PatternState,
}

/// Everything that can change the state.
#[derive(Debug, Clone)]
pub enum Event {
    PatternChanged(String),
    InputChanged(InputState),
    ProteinFetched(SequenceRecord),
    ProteinFetchFailed {
        accession: Accession,
        message: String,
    },
}

impl State {
    pub fn reduce(&self, event: Event) -> State {
        match event {
            Event::PatternChanged(input) => {
                let pattern = PatternState::compile(&input);
                let fastas = self.input.fastas().map(|fs, _| match fs {
                    FetchState::Ok(set) => FetchState::Ok(sequence::match_record(
                        Arc::clone(&set.record),
                        pattern.regex.as_ref(),
                    )),
                    FetchState::Loading | FetchState::Error { .. } => fs.clone(),
                });
                State {
                    input: self.input.with_fastas(fastas),
                    pattern,
                }
            }
            Event::InputChanged(input) => State {
                input,
                pattern: self.pattern.clone(),
            },
            Event::ProteinFetched(record) => {
                let accession = record.accession.clone();
                let set = sequence::match_record(Arc::new(record), self.pattern.regex.as_ref());
                self.with_fastas(self.input.fastas().update(&accession, FetchState::Ok(set)))
            }
            Event::ProteinFetchFailed { accession, message } => self.with_fastas(
                self.input
                    .fastas()
                    .update(&accession, FetchState::Error { message }),
            ),
        }
    }

    fn with_fastas(&self, fastas: Fastas) -> State {
        State {
            input: self.input.with_fastas(fastas),
            pattern: self.pattern.clone(),
        }
    }
}

/// Result of re-deriving the input state from raw editor text.
#[derive(Debug, Clone)]
pub struct InputPlan {
    pub input: InputState,
    /// Accessions absent from the previous map, in order of appearance.
    pub fresh: Vec<Accession>,
}

/// Keep ASCII letters (uppercased), digits and line breaks.
pub fn normalize(raw: &str) -> String {
    raw.to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || *c == '\n')
        .collect()
}

/// Derive the next input state from raw text, carrying known accessions over
/// from `previous` so they are never fetched twice.
pub fn plan_input(previous: &InputState, raw: &str) -> InputPlan {
    let normalized = normalize(raw);
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return InputPlan {
            input: InputState::Complete {
                fastas: Fastas::new(),
            },
            fresh: Vec::new(),
        };
    }

    let complete = normalized.ends_with('\n');
    let lines: Vec<&str> = trimmed
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let (candidates, rest) = match (complete, lines.split_last()) {
        (false, Some((last, init))) => (init, Some(*last)),
        _ => (lines.as_slice(), None),
    };

    let known = previous.fastas();
    let mut fastas = Fastas::new();
    let mut fresh: Vec<Accession> = Vec::new();
    for line in candidates {
        let accession = Accession::new(*line);
        if !known.contains_key(&accession) && !fresh.contains(&accession) {
            fresh.push(accession.clone());
        }
        let carried = known.get_or(&accession, FetchState::Loading);
        fastas = fastas.set(accession, carried);
    }

    let input = match rest {
        Some(rest) => InputState::Incomplete {
            fastas,
            rest: rest.to_string(),
        },
        None => InputState::Complete { fastas },
    };
    InputPlan { input, fresh }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acc(s: &str) -> Accession {
        Accession::new(s)
    }

    fn record(accession: &str, sequence: &str) -> SequenceRecord {
        SequenceRecord {
            accession: acc(accession),
            title: format!(">sp|{accession}|TEST"),
            sequence: sequence.into(),
        }
    }

    fn committed(state: &State, raw: &str) -> State {
        let plan = plan_input(&state.input, raw);
        state.reduce(Event::InputChanged(plan.input))
    }

    #[test]
    fn initial_state_is_empty_and_incomplete() {
        let state = State::default();
        assert!(matches!(
            &state.input,
            InputState::Incomplete { rest, fastas } if rest.is_empty() && fastas.is_empty()
        ));
        assert!(state.pattern.regex.is_none());
    }

    #[test]
    fn completed_line_becomes_loading_entry() {
        let plan = plan_input(&InputState::default(), "Q9Y7B1\n");
        assert!(matches!(plan.input, InputState::Complete { .. }));
        assert_eq!(plan.input.fastas().keys(), vec![acc("Q9Y7B1")]);
        assert_eq!(plan.input.fastas().get(&acc("Q9Y7B1")), Some(&FetchState::Loading));
        assert_eq!(plan.fresh, vec![acc("Q9Y7B1")]);
    }

    #[test]
    fn trailing_partial_line_is_held_back() {
        let plan = plan_input(&InputState::default(), "Q9Y7B1\nA0");
        match &plan.input {
            InputState::Incomplete { fastas, rest } => {
                assert_eq!(rest, "A0");
                assert_eq!(fastas.keys(), vec![acc("Q9Y7B1")]);
            }
            other => panic!("expected incomplete input, got {other:?}"),
        }
        assert_eq!(plan.fresh, vec![acc("Q9Y7B1")]);
    }

    #[test]
    fn normalizes_case_and_strips_noise() {
        let plan = plan_input(&InputState::default(), " q9y-7b1 \n\n c1phg1;\n");
        assert_eq!(plan.input.fastas().keys(), vec![acc("Q9Y7B1"), acc("C1PHG1")]);
    }

    #[test]
    fn duplicates_collapse_in_order() {
        let plan = plan_input(&InputState::default(), "B\nA\nB\nC\n");
        assert_eq!(plan.input.fastas().keys(), vec![acc("A"), acc("B"), acc("C")]);
        assert_eq!(plan.fresh, vec![acc("B"), acc("A"), acc("C")]);
    }

    #[test]
    fn empty_or_noise_text_resets_to_complete() {
        for raw in ["", "   ", "--\n"] {
            let plan = plan_input(&InputState::default(), raw);
            assert!(matches!(
                &plan.input,
                InputState::Complete { fastas } if fastas.is_empty()
            ));
            assert!(plan.fresh.is_empty());
        }
    }

    #[test]
    fn known_accessions_are_carried_not_refetched() {
        let state = committed(&State::default(), "Q9Y7B1\n");
        let state = state.reduce(Event::ProteinFetched(record("Q9Y7B1", "MAAK")));

        let plan = plan_input(&state.input, "Q9Y7B1\nC1PHG1\n");
        assert_eq!(plan.fresh, vec![acc("C1PHG1")]);
        assert!(matches!(
            plan.input.fastas().get(&acc("Q9Y7B1")),
            Some(FetchState::Ok(_))
        ));
        assert_eq!(plan.input.fastas().get(&acc("C1PHG1")), Some(&FetchState::Loading));
    }

    #[test]
    fn fetched_record_without_pattern_has_no_matches() {
        let state = committed(&State::default(), "Q9Y7B1\n");
        let state = state.reduce(Event::ProteinFetched(record("Q9Y7B1", "MAAK")));
        assert_eq!(state.input.fastas().get(&acc("Q9Y7B1")).and_then(FetchState::match_count), Some(0));
    }

    #[test]
    fn results_for_removed_accessions_are_dropped() {
        let state = committed(&State::default(), "Q9Y7B1\n");
        let state = committed(&state, "");
        let state = state.reduce(Event::ProteinFetched(record("Q9Y7B1", "MAAK")));
        assert!(state.input.fastas().is_empty());

        let state = state.reduce(Event::ProteinFetchFailed {
            accession: acc("Q9Y7B1"),
            message: FETCH_FAILED_MESSAGE.into(),
        });
        assert!(state.input.fastas().is_empty());
    }

    #[test]
    fn pattern_change_only_touches_ok_entries() {
        let state = committed(&State::default(), "A\nB\nC\n");
        let state = state.reduce(Event::ProteinFetched(record("A", "MAAK")));
        let state = state.reduce(Event::ProteinFetchFailed {
            accession: acc("B"),
            message: FETCH_FAILED_MESSAGE.into(),
        });

        let next = state.reduce(Event::PatternChanged("AA".into()));
        assert_eq!(next.input.fastas().keys(), state.input.fastas().keys());
        assert_eq!(next.input.fastas().get(&acc("A")).and_then(FetchState::match_count), Some(1));
        assert_eq!(
            next.input.fastas().get(&acc("B")),
            Some(&FetchState::Error { message: FETCH_FAILED_MESSAGE.into() })
        );
        assert_eq!(next.input.fastas().get(&acc("C")), Some(&FetchState::Loading));
        // the previous snapshot is untouched
        assert_eq!(state.input.fastas().get(&acc("A")).and_then(FetchState::match_count), Some(0));
    }

    #[test]
    fn fetched_record_uses_current_pattern() {
        let state = committed(&State::default(), "A\n").reduce(Event::PatternChanged("AA".into()));
        let state = state.reduce(Event::ProteinFetched(record("A", "MAAK")));
        match state.input.fastas().get(&acc("A")) {
            Some(FetchState::Ok(set)) => assert_eq!(set.matches, vec![(1, 3)]),
            other => panic!("expected loaded record, got {other:?}"),
        }
    }

    #[test]
    fn invalid_pattern_is_reported_and_clears_matches() {
        let state = committed(&State::default(), "A\n")
            .reduce(Event::ProteinFetched(record("A", "MAAK")))
            .reduce(Event::PatternChanged("AA".into()))
            .reduce(Event::PatternChanged("A(".into()));
        assert!(state.pattern.regex.is_none());
        assert!(state.pattern.error.is_some());
        assert_eq!(state.pattern.input, "A(");
        assert_eq!(state.input.fastas().get(&acc("A")).and_then(FetchState::match_count), Some(0));
    }

    #[test]
    fn incomplete_rest_survives_fetch_results() {
        let state = committed(&State::default(), "A\nB");
        let state = state.reduce(Event::ProteinFetched(record("A", "MAAK")));
        assert!(matches!(&state.input, InputState::Incomplete { rest, .. } if rest == "B"));
    }

    #[test]
    fn text_renders_committed_keys_and_rest() {
        let complete = plan_input(&InputState::default(), "a\nb\na\n").input;
        assert_eq!(complete.text(), "B\nA\n");

        let incomplete = plan_input(&InputState::default(), "a\nb").input;
        assert_eq!(incomplete.text(), "A\nB");

        let empty = plan_input(&InputState::default(), "").input;
        assert_eq!(empty.text(), "");
    }
}

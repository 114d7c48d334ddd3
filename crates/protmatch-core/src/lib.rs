pub mod config;
pub mod controller;
pub mod error;
pub mod highlight;
pub mod ordered_map;
pub mod sequence;
pub mod state;

pub use config::ProtmatchConfig;
pub use controller::{Dispatch, InputController, SequenceFetcher};
pub use error::{HighlightError, ProtmatchError, Result};
pub use ordered_map::OrderedMap;
pub use sequence::{Accession, MatchSet, SequenceRecord};
pub use state::{Event, FetchState, InputState, PatternState, State};

//! Core library for the lexideck vocabulary service.
//!
//! Provides:
//! - Lenient normalization of deck and tag fields read from the store
//! - Single-row lookup error classification
//! - Parsing of AI batch job output and building of batch request files
//! - Spaced repetition scheduling
//! - Per-deck AI prompt templates
//! - Collocation merging and the supported language table
//! - Review session state (answer input, progress, alerts)
//! - Shared types (Deck, Tag, Word, DeckWord, ReviewDifficulty, etc.)

pub mod algorithm;
pub mod batch;
pub mod collocations;
pub mod error;
pub mod jsonl;
pub mod languages;
pub mod normalize;
pub mod prompts;
pub mod query;
pub mod review;
pub mod types;

pub use algorithm::{get_algorithm, SchedulingResult, SpacedRepetitionAlgorithm};
pub use batch::{
    detect_language_from_filename, filter_error_results, filter_valid_results,
    is_valid_parsed_result, parse_batch_file, parse_batch_line, partition_results, ParsedLine,
    ParsedResult, ParsedResultError,
};
pub use collocations::merge_collocations;
pub use error::{CoreError, DataAccessError, Result};
pub use normalize::{normalize_ans_langs, normalize_deck, normalize_name};
pub use prompts::{render_prompt, AiPrompts, PromptContext};
pub use query::{handle_single_query_error, QueryError, NOT_FOUND_CODE};
pub use review::{AlertKind, AlertState, AnswerInput, QuestionCard, ReviewProgress};
pub use types::{
    CardState, CardStatus, Collocation, CollocationsPattern, Deck, DeckWord,
    DifficultyOption, ProficiencyLevel, ReviewDifficulty, Tag, Word, DIFFICULTY_OPTIONS,
};

//! Core types for the vocabulary deck application.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::languages::require_language;
use crate::normalize::lenient_string_list;

pub use crate::prompts::{render_prompt, AiPrompts, DEFAULT_REVIEW_PROMPT};

/// Maximum deck name length in characters.
pub const MAX_DECK_NAME_LEN: usize = 50;

/// A single collocation suggested for a word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collocation {
    pub collocation: String,
    pub difficulty: String,
}

/// Collocations grouped by phrase pattern (e.g. "Verb Phrase").
pub type CollocationsPattern = BTreeMap<String, Vec<Collocation>>;

/// Deck record as returned to callers. `ans_langs` is always a list,
/// whatever shape the store handed back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub que_lang: String,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub ans_langs: Vec<String>,
    pub diff_level: ProficiencyLevel,
    #[serde(default)]
    pub ai_prompts: AiPrompts,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Deck {
    /// Decode a raw row, normalizing `ans_langs` on the way.
    pub fn from_row(row: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(crate::normalize::normalize_deck(row))
    }
}

/// Input for creating a deck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDeckInput {
    pub name: String,
    pub que_lang: String,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub ans_langs: Vec<String>,
    pub diff_level: ProficiencyLevel,
    #[serde(default)]
    pub ai_prompts: Option<AiPrompts>,
}

impl CreateDeckInput {
    /// Check the name length limit.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_deck_name(&self.name)
    }
}

/// Input for updating a deck. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDeckInput {
    pub name: Option<String>,
    pub que_lang: Option<String>,
    #[serde(default, deserialize_with = "crate::normalize::lenient_optional_string_list")]
    pub ans_langs: Option<Vec<String>>,
    pub diff_level: Option<ProficiencyLevel>,
    pub ai_prompts: Option<AiPrompts>,
}

impl UpdateDeckInput {
    pub fn validate(&self) -> Result<(), CoreError> {
        match &self.name {
            Some(name) => validate_deck_name(name),
            None => Ok(()),
        }
    }
}

fn validate_deck_name(name: &str) -> Result<(), CoreError> {
    if name.chars().count() > MAX_DECK_NAME_LEN {
        return Err(CoreError::DeckNameTooLong {
            max: MAX_DECK_NAME_LEN,
        });
    }
    Ok(())
}

/// Deck listing filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListDecksOptions {
    pub que_lang: Option<String>,
    pub diff_level: Option<ProficiencyLevel>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A language the user studies, with their current level in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetLanguage {
    pub language_code: String,
    pub proficiency: ProficiencyLevel,
}

/// User profile as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub mother_tongues: Vec<String>,
    #[serde(default)]
    pub target_languages: Vec<TargetLanguage>,
    /// Free-form prompt presets, keyed by use.
    #[serde(default)]
    pub prompts: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile update. Absent fields are left unchanged; `is_admin` is not
/// settable here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileInput {
    pub username: Option<String>,
    pub mother_tongues: Option<Vec<String>>,
    pub target_languages: Option<Vec<TargetLanguage>>,
    pub prompts: Option<BTreeMap<String, serde_json::Value>>,
}

impl UpdateProfileInput {
    /// Every language code must be in the supported table.
    pub fn validate(&self) -> Result<(), CoreError> {
        for code in self.mother_tongues.iter().flatten() {
            require_language(code)?;
        }
        for target in self.target_languages.iter().flatten() {
            require_language(&target.language_code)?;
        }
        Ok(())
    }
}

/// Deck proficiency level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProficiencyLevel {
    Elementary,
    Intermediate,
    UpperIntermediate,
    Advanced,
    Native,
}

impl ProficiencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Elementary => "elementary",
            Self::Intermediate => "intermediate",
            Self::UpperIntermediate => "upper_intermediate",
            Self::Advanced => "advanced",
            Self::Native => "native",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Elementary => "Elementary",
            Self::Intermediate => "Intermediate",
            Self::UpperIntermediate => "Upper Intermediate",
            Self::Advanced => "Advanced",
            Self::Native => "Native",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Elementary => "Basic words and phrases",
            Self::Intermediate => "Can handle everyday situations",
            Self::UpperIntermediate => "Comfortable in most situations",
            Self::Advanced => "Fluent with minor gaps",
            Self::Native => "Native speaker level",
        }
    }

    pub const ALL: [ProficiencyLevel; 5] = [
        Self::Elementary,
        Self::Intermediate,
        Self::UpperIntermediate,
        Self::Advanced,
        Self::Native,
    ];
}

impl Default for ProficiencyLevel {
    fn default() -> Self {
        Self::Elementary
    }
}

impl FromStr for ProficiencyLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| CoreError::InvalidProficiency(s.to_string()))
    }
}

impl fmt::Display for ProficiencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub normalized_name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTagInput {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTagInput {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListTagsOptions {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub q: Option<String>,
}

/// Word record with its collocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub id: String,
    pub lemma: String,
    pub lang: String,
    #[serde(default)]
    pub collocations: CollocationsPattern,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateWordInput {
    pub lemma: String,
    pub lang: String,
    #[serde(default)]
    pub collocations: CollocationsPattern,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateWordInput {
    pub collocations: Option<CollocationsPattern>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListWordsOptions {
    pub lang: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Learning state of a card within a deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    New,
    Learning,
    Review,
    Relearning,
}

impl Default for CardStatus {
    fn default() -> Self {
        Self::New
    }
}

impl CardStatus {
    /// Stored numeric value (1=new, 2=learning, 3=review, 4=relearning).
    pub fn to_value(self) -> i32 {
        match self {
            Self::New => 1,
            Self::Learning => 2,
            Self::Review => 3,
            Self::Relearning => 4,
        }
    }

    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::New),
            2 => Some(Self::Learning),
            3 => Some(Self::Review),
            4 => Some(Self::Relearning),
            _ => None,
        }
    }
}

/// Scheduling metrics for one card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardState {
    pub status: CardStatus,
    pub stability: f64,
    pub difficulty: f64,
    pub step: i32,
    pub due: DateTime<Utc>,
    pub last_review: Option<DateTime<Utc>>,
}

impl CardState {
    /// Fresh state for a card added at `now`.
    pub fn new_card(now: DateTime<Utc>) -> Self {
        Self {
            status: CardStatus::New,
            stability: 0.0,
            difficulty: 0.0,
            step: 0,
            due: now,
            last_review: None,
        }
    }
}

/// A word placed in a deck, with its learning metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckWord {
    pub id: String,
    pub deck_id: String,
    pub word_id: String,
    pub state: i32,
    pub stability: f64,
    pub difficulty: f64,
    pub due: DateTime<Utc>,
    pub last_review: Option<DateTime<Utc>>,
    pub step: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DeckWord {
    /// Scheduling view of this card. Unknown stored states read as new.
    pub fn card_state(&self) -> CardState {
        CardState {
            status: CardStatus::from_value(self.state).unwrap_or_default(),
            stability: self.stability,
            difficulty: self.difficulty,
            step: self.step,
            due: self.due,
            last_review: self.last_review,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddWordToDeckInput {
    pub word_id: String,
    pub state: Option<i32>,
    pub stability: Option<f64>,
    pub difficulty: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeckWordOrder {
    Due,
    CreatedAt,
    LastReview,
}

impl DeckWordOrder {
    pub fn column(&self) -> &'static str {
        match self {
            Self::Due => "due",
            Self::CreatedAt => "created_at",
            Self::LastReview => "last_review",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListDeckWordsOptions {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub state: Option<i32>,
    pub order_by: Option<DeckWordOrder>,
    pub ascending: Option<bool>,
}

/// Cards due for review in a deck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DueCardsResponse {
    pub cards: Vec<DeckWord>,
    pub total_due: usize,
    pub next_review: Option<DateTime<Utc>>,
}

/// Review outcome chosen by the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDifficulty {
    Again,
    Hard,
    Good,
    Easy,
}

impl ReviewDifficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
            Self::Easy => "easy",
        }
    }

    /// Presentation metadata for this outcome.
    pub fn option(&self) -> &'static DifficultyOption {
        match self {
            Self::Again => &DIFFICULTY_OPTIONS[0],
            Self::Hard => &DIFFICULTY_OPTIONS[1],
            Self::Good => &DIFFICULTY_OPTIONS[2],
            Self::Easy => &DIFFICULTY_OPTIONS[3],
        }
    }
}

impl FromStr for ReviewDifficulty {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "again" => Ok(Self::Again),
            "hard" => Ok(Self::Hard),
            "good" => Ok(Self::Good),
            "easy" => Ok(Self::Easy),
            other => Err(CoreError::InvalidDifficulty(other.to_string())),
        }
    }
}

impl fmt::Display for ReviewDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static presentation data for a review outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DifficultyOption {
    pub value: ReviewDifficulty,
    pub label: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

pub static DIFFICULTY_OPTIONS: [DifficultyOption; 4] = [
    DifficultyOption {
        value: ReviewDifficulty::Again,
        label: "Again",
        description: "I don't remember",
        icon: "❌",
        color: "bg-red-50 border-red-200 dark:bg-red-950 dark:border-red-800 hover:bg-red-100 dark:hover:bg-red-900 text-red-700 dark:text-red-200",
    },
    DifficultyOption {
        value: ReviewDifficulty::Hard,
        label: "Hard",
        description: "Difficult to recall",
        icon: "😓",
        color: "bg-orange-50 border-orange-200 dark:bg-orange-950 dark:border-orange-800 hover:bg-orange-100 dark:hover:bg-orange-900 text-orange-700 dark:text-orange-200",
    },
    DifficultyOption {
        value: ReviewDifficulty::Good,
        label: "Good",
        description: "Correct, but slow",
        icon: "👍",
        color: "bg-blue-50 border-blue-200 dark:bg-blue-950 dark:border-blue-800 hover:bg-blue-100 dark:hover:bg-blue-900 text-blue-700 dark:text-blue-200",
    },
    DifficultyOption {
        value: ReviewDifficulty::Easy,
        label: "Easy",
        description: "Correct & fast",
        icon: "⭐",
        color: "bg-green-50 border-green-200 dark:bg-green-950 dark:border-green-800 hover:bg-green-100 dark:hover:bg-green-900 text-green-700 dark:text-green-200",
    },
];

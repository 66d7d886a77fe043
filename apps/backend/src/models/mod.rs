//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use lexideck_core::normalize::normalize_ans_langs;
use lexideck_core::CoreError;
// Re-export shared types from lexideck-core
pub use lexideck_core::types::{
    AiPrompts, CollocationsPattern, CreateDeckInput, CreateTagInput, CreateWordInput, Deck,
    DeckWord, DifficultyOption, DueCardsResponse, ListDeckWordsOptions, ListDecksOptions,
    ListTagsOptions, ListWordsOptions, ProficiencyLevel, ReviewDifficulty, Tag, TargetLanguage,
    UpdateDeckInput, UpdateProfileInput, UpdateTagInput, UpdateWordInput, UserProfile, Word,
};
pub use lexideck_core::languages::Language;
pub use lexideck_core::{ParsedResult, ParsedResultError};

// === Database Entity Types ===

/// Registered user. Profile columns are raw JSONB.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub token: String,
    pub username: Option<String>,
    pub mother_tongues: serde_json::Value,
    pub target_languages: serde_json::Value,
    pub prompts: serde_json::Value,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl User {
    /// Convert to the API profile; unreadable profile columns read as empty
    pub fn to_profile(&self) -> UserProfile {
        UserProfile {
            user_id: self.id.to_string(),
            username: self.username.clone(),
            mother_tongues: normalize_ans_langs(&self.mother_tongues),
            target_languages: serde_json::from_value(self.target_languages.clone())
                .unwrap_or_default(),
            prompts: serde_json::from_value(self.prompts.clone()).unwrap_or_default(),
            is_admin: self.is_admin,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Deck row. `ans_langs` and `ai_prompts` are raw JSONB and may hold any shape.
#[derive(Debug, Clone, FromRow)]
pub struct DbDeck {
    pub id: String,
    pub user_id: Uuid,
    pub name: String,
    pub que_lang: String,
    pub ans_langs: serde_json::Value,
    pub diff_level: String,
    pub ai_prompts: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbDeck {
    /// Convert to API deck type, normalizing loosely typed columns
    pub fn to_api_deck(&self) -> Deck {
        Deck {
            id: self.id.clone(),
            user_id: self.user_id.to_string(),
            name: self.name.clone(),
            que_lang: self.que_lang.clone(),
            ans_langs: normalize_ans_langs(&self.ans_langs),
            diff_level: self.diff_level.parse().unwrap_or_default(),
            ai_prompts: serde_json::from_value(self.ai_prompts.clone()).unwrap_or_default(),
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbTag {
    pub id: Uuid,
    pub name: String,
    pub normalized_name: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbTag {
    pub fn to_api_tag(&self) -> Tag {
        Tag {
            id: self.id.to_string(),
            name: self.name.clone(),
            normalized_name: self.normalized_name.clone(),
            created_by: self.created_by.map(|id| id.to_string()),
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbWord {
    pub id: Uuid,
    pub lemma: String,
    pub lang: String,
    pub collocations: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbWord {
    /// Collocations column decoded
    pub fn collocations(&self) -> std::result::Result<CollocationsPattern, serde_json::Error> {
        serde_json::from_value(self.collocations.clone())
    }

    pub fn to_api_word(&self) -> Word {
        Word {
            id: self.id.to_string(),
            lemma: self.lemma.clone(),
            lang: self.lang.clone(),
            collocations: self.collocations().unwrap_or_else(|err| {
                tracing::warn!("Word {} has malformed collocations: {}", self.id, err);
                CollocationsPattern::default()
            }),
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbDeckWord {
    pub id: Uuid,
    pub deck_id: String,
    pub word_id: Uuid,
    pub state: i32,
    pub stability: f64,
    pub difficulty: f64,
    pub due: DateTime<Utc>,
    pub last_review: Option<DateTime<Utc>>,
    pub step: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbDeckWord {
    pub fn to_api_deck_word(&self) -> DeckWord {
        DeckWord {
            id: self.id.to_string(),
            deck_id: self.deck_id.clone(),
            word_id: self.word_id.to_string(),
            state: self.state,
            stability: self.stability,
            difficulty: self.difficulty,
            due: self.due,
            last_review: self.last_review,
            step: self.step,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

// === API Request/Response Types ===

/// User registration request
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}


#[derive(Debug, Serialize)]
pub struct DeckListResponse {
    pub decks: Vec<Deck>,
    /// All of the user's decks, ignoring filters and paging
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct TagListResponse {
    pub tags: Vec<Tag>,
}

#[derive(Debug, Serialize)]
pub struct WordListResponse {
    pub words: Vec<Word>,
}

#[derive(Debug, Serialize)]
pub struct DeckWordListResponse {
    pub deck_words: Vec<DeckWord>,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct LanguageListResponse {
    pub languages: Vec<String>,
}

/// Languages the service can generate collocations for
#[derive(Debug, Serialize)]
pub struct SupportedLanguagesResponse {
    pub languages: &'static [Language],
}

#[derive(Debug, Deserialize)]
pub struct WordSearchQuery {
    pub q: String,
    pub lang: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct DueCardsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DifficultyOptionsResponse {
    pub options: &'static [DifficultyOption],
}

/// Review verdict for a deck word
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResultRequest {
    pub card_id: String,
    pub difficulty: String,
}

impl SubmitResultRequest {
    /// Only `again`, `hard`, `good` and `easy` are accepted
    pub fn difficulty(&self) -> Result<ReviewDifficulty, CoreError> {
        self.difficulty.parse()
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResultResponse {
    pub success: bool,
    pub card_id: Uuid,
    pub new_state: i32,
    pub new_stability: f64,
    pub new_difficulty: f64,
    pub next_due_date: DateTime<Utc>,
    pub scheduled_days: i64,
    pub message: String,
}

/// Free-text answer to be graded
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub user_answer: String,
    #[serde(default)]
    pub word_lemma: String,
    pub expected_answer: Option<String>,
    pub difficulty: Option<String>,
    pub deck_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitAnswerResponse {
    pub review: String,
}

/// Question card generated in one call
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionRequest {
    #[serde(default)]
    pub word: String,
    pub collocation: Option<String>,
    pub difficulty: Option<String>,
    /// Language code or name of the answer sentence
    #[serde(default)]
    pub question_language: String,
    #[serde(default, deserialize_with = "lexideck_core::normalize::lenient_string_list")]
    pub answer_languages: Vec<String>,
    /// Deck whose question template to use; the default template otherwise
    pub deck_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub question: String,
    pub answer: String,
    pub hints: Vec<String>,
}

/// Answer sentence for a deck word
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAnswerRequest {
    #[serde(default)]
    pub deck_id: String,
    #[serde(default)]
    pub word_id: String,
    pub collocation: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
}

/// Hints for the words of an answer sentence
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateHintsRequest {
    #[serde(default)]
    pub deck_id: String,
    #[serde(default)]
    pub word_id: String,
    #[serde(default)]
    pub answer_sentence: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HintsResponse {
    pub hints: Vec<String>,
}

/// Translation of an answer sentence into the deck's answer languages
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTranslationRequest {
    #[serde(default)]
    pub deck_id: String,
    #[serde(default)]
    pub answer_sentence: String,
}

/// Batch output file submitted for parsing or import
#[derive(Debug, Deserialize)]
pub struct BatchFileRequest {
    pub content: String,
    pub filename: Option<String>,
    /// Overrides the language detected from `filename`
    pub lang: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchParseResponse {
    pub detected_language: Option<String>,
    pub total: usize,
    pub valid: Vec<ParsedResult>,
    pub errors: Vec<ParsedResultError>,
}

#[derive(Debug, Serialize)]
pub struct BatchImportResponse {
    pub lang: String,
    pub imported: usize,
    pub words: Vec<Word>,
    pub errors: Vec<ParsedResultError>,
}

/// Words to build a batch request file for
#[derive(Debug, Deserialize)]
pub struct BatchRequestsRequest {
    /// Newline-separated word list
    pub words: String,
    pub lang: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn db_deck(ans_langs: serde_json::Value) -> DbDeck {
        DbDeck {
            id: "abcdefghijk".to_string(),
            user_id: Uuid::nil(),
            name: "Deck".to_string(),
            que_lang: "ja".to_string(),
            ans_langs,
            diff_level: "upper_intermediate".to_string(),
            ai_prompts: json!({}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_deck_row_normalizes_ans_langs() {
        assert_eq!(db_deck(json!("[\"fa\",\"en\"]")).to_api_deck().ans_langs, vec!["fa", "en"]);
        assert_eq!(db_deck(json!("fa")).to_api_deck().ans_langs, vec!["fa"]);
        assert!(db_deck(json!(null)).to_api_deck().ans_langs.is_empty());
    }

    #[test]
    fn test_deck_row_defaults_prompts_and_level() {
        let deck = db_deck(json!([])).to_api_deck();
        assert_eq!(deck.diff_level, ProficiencyLevel::UpperIntermediate);
        assert_eq!(deck.ai_prompts, AiPrompts::default());
    }

    #[test]
    fn test_word_row_reads_bad_collocations_as_empty() {
        let word = DbWord {
            id: Uuid::nil(),
            lemma: "run".to_string(),
            lang: "en".to_string(),
            collocations: json!(["not", "a", "map"]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(word.to_api_word().collocations.is_empty());
    }

    #[test]
    fn test_user_profile_from_row() {
        let user = User {
            id: Uuid::nil(),
            token: "t".to_string(),
            username: Some("learner".to_string()),
            mother_tongues: json!("[\"fa\"]"),
            target_languages: json!([{ "languageCode": "ja", "proficiency": "advanced" }]),
            prompts: json!("not an object"),
            is_admin: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_seen_at: Utc::now(),
        };
        let profile = user.to_profile();
        assert_eq!(profile.mother_tongues, vec!["fa"]);
        assert_eq!(
            profile.target_languages,
            vec![TargetLanguage {
                language_code: "ja".to_string(),
                proficiency: ProficiencyLevel::Advanced,
            }]
        );
        assert!(profile.prompts.is_empty());
        assert!(profile.is_admin);
    }

    #[test]
    fn test_generate_question_accepts_single_language_string() {
        let request: GenerateQuestionRequest = serde_json::from_value(json!({
            "word": "走る",
            "questionLanguage": "ja",
            "answerLanguages": "en"
        }))
        .unwrap();
        assert_eq!(request.answer_languages, vec!["en"]);
        assert_eq!(request.deck_id, None);
    }

    #[test]
    fn test_submit_result_rejects_unknown_difficulty() {
        let request: SubmitResultRequest = serde_json::from_value(json!({
            "cardId": Uuid::nil().to_string(),
            "difficulty": "medium"
        }))
        .unwrap();
        assert_eq!(
            request.difficulty(),
            Err(CoreError::InvalidDifficulty("medium".to_string()))
        );
    }
}

//! Per-deck AI prompt templates.
//!
//! Templates use `{name}` placeholders. A deck stores its own copy of each
//! template so learners can tune the wording; missing keys fall back to the
//! defaults below.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// AI prompt templates stored per deck.
///
/// Known keys are typed; anything else the client sends is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiPrompts {
    #[serde(default = "default_review_prompt")]
    pub review: String,
    #[serde(default = "default_question_prompt")]
    pub question: String,
    #[serde(rename = "answerGeneration", default = "default_answer_generation_prompt")]
    pub answer_generation: String,
    #[serde(
        rename = "questionTranslation",
        default = "default_question_translation_prompt"
    )]
    pub question_translation: String,
    #[serde(rename = "hintsGeneration", default = "default_hints_generation_prompt")]
    pub hints_generation: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl Default for AiPrompts {
    fn default() -> Self {
        Self {
            review: default_review_prompt(),
            question: default_question_prompt(),
            answer_generation: default_answer_generation_prompt(),
            question_translation: default_question_translation_prompt(),
            hints_generation: default_hints_generation_prompt(),
            extra: BTreeMap::new(),
        }
    }
}

fn default_review_prompt() -> String {
    DEFAULT_REVIEW_PROMPT.to_string()
}

fn default_question_prompt() -> String {
    DEFAULT_QUESTION_PROMPT.to_string()
}

fn default_answer_generation_prompt() -> String {
    DEFAULT_ANSWER_GENERATION_PROMPT.to_string()
}

fn default_question_translation_prompt() -> String {
    DEFAULT_QUESTION_TRANSLATION_PROMPT.to_string()
}

fn default_hints_generation_prompt() -> String {
    DEFAULT_HINTS_GENERATION_PROMPT.to_string()
}

/// Default template for grading a free-text answer.
///
/// Placeholders are substituted by [`render_prompt`].
pub const DEFAULT_REVIEW_PROMPT: &str = "You are a helpful {question_language} teacher reviewing a student's answer. \
Give very short, constructive feedback. The main goal is checking use of '{word_lemma}'. Reply in {answer_languages}.
If the student didn't answer, explain the correct answer briefly.

References:
- Difficulty Level: {difficulty}
- Target Word/Lemma: {word_lemma}
- Question: {question}
- Student's Answer: {user_answer}
- Expected/Reference Answer: {expected_answer}

Scoring (apply exactly):
1) score = 0
2) If '{word_lemma}' appears in any valid form (kanji/kana/reading/conjugation): +10
3) If meaning does not match the correct answer: -1 and briefly explain why
4) For each grammar mistake: -1; give a correction + brief reason
5) Clamp score to 0-10

Output:
- Review: ultra-brief, one sentence per line, each line begins with an emoji, no headings
- Then a simple Markdown table listing each +/- with its reason (one row per item)
- End with: ### Overall Score: [score]/10 + an emoji";

/// Default template for a whole question card in one call.
pub const DEFAULT_QUESTION_PROMPT: &str = "You write {question_language} flashcard questions.

Answer: a short, natural everyday {question_language} sentence at {difficulty} level that uses '{word}'. \
You may take ideas from the collocation '{collocation}' but must not copy it. \
Every other word must suit the {difficulty} level.
Question: a literal translation of the answer into {answer_languages}.
Hints: translations and readings of every word in the answer except '{word}'.

If {question_language} is Japanese, put the hiragana reading in parentheses right after each kanji, \
for example 明日(あした).
Never include '{word}' in the hints.";

/// Default template for the answer sentence.
pub const DEFAULT_ANSWER_GENERATION_PROMPT: &str = "You write example sentences for {question_language} learners.

Write one short, natural everyday sentence at {difficulty} level that uses '{word}'.
- You may take ideas from the collocation '{collocation}' but must not copy it.
- Every word other than '{word}' must suit the {difficulty} level.
- If {question_language} is Japanese, put the hiragana reading in parentheses right after each kanji, \
for example 会議(かいぎ).";

/// Default template for translating the answer sentence into the question.
pub const DEFAULT_QUESTION_TRANSLATION_PROMPT: &str = "You translate material for language learners.

Translate this {question_language} sentence into {answer_languages}:
{answer_sentence}

- Stay literal where the meaning allows it.
- Separate translations into different languages with \" / \".
- Reply with the translation only.";

/// Default template for vocabulary hints on the answer sentence.
pub const DEFAULT_HINTS_GENERATION_PROMPT: &str = "You write vocabulary hints for {question_language} learners.

Sentence:
{answer_sentence}

Give one hint for every word in the sentence except '{word}', in {answer_languages}.
- Format: \"translation1/translation2: word(reading)\"
- For Japanese kanji, include the hiragana reading, for example 明日(あした).
- Check again that '{word}' is not among the hints.";

/// Substitute `{name}` placeholders in a prompt template.
/// Unknown placeholders are left as-is.
pub fn render_prompt(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{}}}", key), value)
    })
}

/// Values available to the question, answer, translation and hints templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptContext<'a> {
    pub question_language: &'a str,
    pub answer_languages: &'a str,
    pub word: &'a str,
    pub collocation: &'a str,
    pub difficulty: &'a str,
    pub answer_sentence: &'a str,
}

impl PromptContext<'_> {
    pub fn render(&self, template: &str) -> String {
        render_prompt(
            template,
            &[
                ("question_language", self.question_language),
                ("answer_languages", self.answer_languages),
                ("word", self.word),
                ("collocation", self.collocation),
                ("difficulty", self.difficulty),
                ("answer_sentence", self.answer_sentence),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn ai_prompts_read_known_keys_and_keep_unknown_ones() {
        let prompts: AiPrompts = serde_json::from_value(json!({
            "review": "Grade {word_lemma}",
            "hintsGeneration": "Hints for {word}",
            "legacyPrompt": "kept"
        }))
        .unwrap();
        assert_eq!(prompts.review, "Grade {word_lemma}");
        assert_eq!(prompts.hints_generation, "Hints for {word}");
        assert_eq!(prompts.question, DEFAULT_QUESTION_PROMPT);
        assert_eq!(prompts.extra.get("legacyPrompt").map(String::as_str), Some("kept"));
        assert!(!prompts.extra.contains_key("hintsGeneration"));
    }

    #[test]
    fn ai_prompts_serialize_with_stored_key_names() {
        let value = serde_json::to_value(AiPrompts::default()).unwrap();
        for key in ["review", "question", "answerGeneration", "questionTranslation", "hintsGeneration"] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn render_prompt_substitutes_known_placeholders() {
        let rendered = render_prompt(
            "Check '{word_lemma}' in {lang} {unknown}",
            &[("word_lemma", "走る"), ("lang", "Japanese")],
        );
        assert_eq!(rendered, "Check '走る' in Japanese {unknown}");
    }

    #[test]
    fn default_templates_leave_no_placeholders() {
        let ctx = PromptContext {
            question_language: "Japanese",
            answer_languages: "English and Persian",
            word: "参加する",
            collocation: "会議に参加する",
            difficulty: "intermediate",
            answer_sentence: "明日(あした)会議(かいぎ)に参加(さんか)する。",
        };
        for template in [
            DEFAULT_QUESTION_PROMPT,
            DEFAULT_ANSWER_GENERATION_PROMPT,
            DEFAULT_QUESTION_TRANSLATION_PROMPT,
            DEFAULT_HINTS_GENERATION_PROMPT,
        ] {
            let prompt = ctx.render(template);
            assert!(!prompt.contains('{'), "unfilled placeholder in {}", prompt);
        }
        assert!(ctx
            .render(DEFAULT_HINTS_GENERATION_PROMPT)
            .contains("except '参加する', in English and Persian"));
    }
}

//! State for a deck review session: answer entry, progress and alerts.
//!
//! These are plain values owned by one session. Rendering is left to
//! whatever front end drives them.

use serde::{Deserialize, Serialize};

/// Free-text answer box for the current card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerInput {
    pub value: String,
    pub is_loading: bool,
    pub is_disabled: bool,
    /// Verdict returned for the current answer, if any.
    pub review: Option<String>,
}

impl AnswerInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        if !self.is_read_only() {
            self.value = value.into();
        }
    }

    pub fn has_review(&self) -> bool {
        self.review.is_some()
    }

    /// Text entry is locked once disabled or reviewed.
    pub fn is_read_only(&self) -> bool {
        self.is_disabled || self.has_review()
    }

    pub fn can_submit(&self) -> bool {
        !self.value.trim().is_empty() && !self.is_loading && !self.is_disabled && !self.has_review()
    }

    /// Enter submits; Shift+Enter inserts a newline.
    pub fn should_submit_on_key(&self, key: &str, shift: bool) -> bool {
        key == "Enter" && !shift && self.can_submit()
    }

    /// Mark a submission as in flight. Returns the trimmed answer, or `None`
    /// when submission is not allowed.
    pub fn begin_submit(&mut self) -> Option<String> {
        if !self.can_submit() {
            return None;
        }
        self.is_loading = true;
        Some(self.value.trim().to_string())
    }

    /// Record the outcome of a submission. A failed submission leaves the
    /// input editable so the learner can retry.
    pub fn finish_submit(&mut self, verdict: Option<String>) {
        self.is_loading = false;
        if verdict.is_some() {
            self.review = verdict;
        }
    }

    pub fn button_label(&self) -> &'static str {
        if self.is_loading {
            "Reviewing..."
        } else {
            "Submit Answer"
        }
    }

    /// Clear everything for the next card.
    pub fn reset(&mut self) {
        *self = Self {
            is_disabled: self.is_disabled,
            ..Self::default()
        };
    }
}

/// Position within a review session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewProgress {
    /// Zero-based index of the current card.
    pub index: usize,
    pub total: usize,
}

impl ReviewProgress {
    pub fn new(index: usize, total: usize) -> Self {
        Self { index, total }
    }

    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.index + 1) as f64 / self.total as f64 * 100.0
    }

    pub fn display_percent(&self) -> u32 {
        self.percent().round() as u32
    }

    pub fn label(&self) -> String {
        format!("Card {} of {}", self.index + 1, self.total)
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.total
    }

    /// Move to the next card. Returns false when the session is finished.
    pub fn advance(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        true
    }
}

/// The question shown for the current card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCard {
    pub question: String,
    pub progress: ReviewProgress,
}

impl QuestionCard {
    pub fn new(question: impl Into<String>, index: usize, total: usize) -> Self {
        Self {
            question: question.into(),
            progress: ReviewProgress::new(index, total),
        }
    }

    pub fn heading(&self) -> String {
        format!("Question {}", self.progress.index + 1)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    #[default]
    Info,
    Success,
    Error,
}

impl AlertKind {
    pub fn default_title(&self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Success => "Success",
            Self::Info => "Information",
        }
    }
}

/// Modal alert shown during a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertState {
    pub is_open: bool,
    pub title: String,
    pub message: String,
    pub kind: AlertKind,
}

impl AlertState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the alert. An empty or missing title falls back to the kind's default.
    pub fn show(&mut self, message: impl Into<String>, kind: AlertKind, title: Option<&str>) {
        let title = match title {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => kind.default_title().to_string(),
        };
        *self = Self {
            is_open: true,
            title,
            message: message.into(),
            kind,
        };
    }

    /// Hide the alert, keeping its content.
    pub fn close(&mut self) {
        self.is_open = false;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blank_answer_cannot_submit() {
        let mut input = AnswerInput::new();
        assert!(!input.can_submit());
        input.set_value("   \n");
        assert!(!input.can_submit());
        input.set_value("走ります");
        assert!(input.can_submit());
    }

    #[test]
    fn enter_without_shift_submits() {
        let mut input = AnswerInput::new();
        input.set_value("answer");
        assert!(input.should_submit_on_key("Enter", false));
        assert!(!input.should_submit_on_key("Enter", true));
        assert!(!input.should_submit_on_key("a", false));
    }

    #[test]
    fn submission_lifecycle_blocks_resubmit() {
        let mut input = AnswerInput::new();
        input.set_value("  my answer ");
        assert_eq!(input.begin_submit().as_deref(), Some("my answer"));
        assert_eq!(input.button_label(), "Reviewing...");
        assert!(input.begin_submit().is_none());

        input.finish_submit(Some("Great job".to_string()));
        assert!(input.has_review());
        assert!(!input.can_submit());
        assert!(!input.should_submit_on_key("Enter", false));

        input.set_value("changed");
        assert_eq!(input.value, "  my answer ");
    }

    #[test]
    fn failed_submission_allows_retry() {
        let mut input = AnswerInput::new();
        input.set_value("answer");
        input.begin_submit();
        input.finish_submit(None);
        assert!(input.can_submit());
    }

    #[test]
    fn reset_clears_review_but_keeps_disabled() {
        let mut input = AnswerInput::new();
        input.set_value("answer");
        input.begin_submit();
        input.finish_submit(Some("ok".to_string()));
        input.is_disabled = true;
        input.reset();
        assert_eq!(input.value, "");
        assert!(!input.has_review());
        assert!(input.is_disabled);
    }

    #[test]
    fn progress_rounds_percent() {
        let progress = ReviewProgress::new(0, 4);
        assert_eq!(progress.display_percent(), 25);
        assert_eq!(progress.label(), "Card 1 of 4");
        assert_eq!(ReviewProgress::new(0, 3).display_percent(), 33);
        assert_eq!(ReviewProgress::new(1, 3).display_percent(), 67);
        assert_eq!(ReviewProgress::new(0, 0).display_percent(), 0);
    }

    #[test]
    fn progress_advances_until_last_card() {
        let mut progress = ReviewProgress::new(0, 2);
        assert!(progress.advance());
        assert!(progress.is_last());
        assert!(!progress.advance());
        assert_eq!(progress.index, 1);
    }

    #[test]
    fn question_card_projects_inputs() {
        let card = QuestionCard::new("What does 走る mean?", 2, 5);
        assert_eq!(card.heading(), "Question 3");
        assert_eq!(card.progress.label(), "Card 3 of 5");
    }

    #[test]
    fn alert_titles_default_by_kind() {
        let mut alert = AlertState::new();
        alert.show("Saved", AlertKind::Success, None);
        assert_eq!(alert.title, "Success");
        assert!(alert.is_open);

        alert.show("Boom", AlertKind::Error, Some(""));
        assert_eq!(alert.title, "Error");

        alert.show("FYI", AlertKind::Info, Some("Heads up"));
        assert_eq!(alert.title, "Heads up");

        alert.close();
        assert!(!alert.is_open);
        assert_eq!(alert.message, "FYI");

        alert.reset();
        assert_eq!(alert, AlertState::default());
    }
}

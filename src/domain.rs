//! Domain models: question records (tagged by kind), per-question check options,
//! and the grade / course / chapter / lesson catalog that hosts them.

use serde::{Deserialize, Serialize};

/// One left/right pair of a matching question (canonical or user-formed).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchPair {
  pub left: String,
  pub right: String,
}

impl MatchPair {
  pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
    Self { left: left.into(), right: right.into() }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageOption {
  pub image_url: String,
  pub label: String,
}

/// Flags that tune text comparison for a question.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOptions {
  #[serde(default)] pub case_sensitive: bool,
  #[serde(default)] pub acceptable_variations: Vec<String>,
}

/// Prompt content plus canonical answer(s), one variant per widget kind.
/// Canonical fields are never touched by user interaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionBody {
  MultipleChoiceSingle {
    question: String,
    choices: Vec<String>,
    correct_answer: String,
  },
  MultipleChoiceMultiple {
    question: String,
    choices: Vec<String>,
    correct_answers: Vec<String>,
  },
  FillInBlank {
    /// "The capital of Oman is ____."
    #[serde(alias = "question")]
    sentence: String,
    correct_answer: String,
  },
  Spelling {
    correct_spelling: String,
    #[serde(default)] word: Option<String>,
    #[serde(default)] audio_url: Option<String>,
    #[serde(default)] instruction: Option<String>,
  },
  Audio {
    audio_url: String,
    correct_answer: String,
    #[serde(default)] instruction: Option<String>,
  },
  Translation {
    sentence: String,
    correct_answer: String,
    #[serde(default)] source_language: Option<String>,
    #[serde(default)] target_language: Option<String>,
  },
  Matching {
    pairs: Vec<MatchPair>,
  },
  WordBank {
    words: Vec<String>,
    correct_order: Vec<String>,
  },
  ImageChoice {
    word: String,
    image_choices: Vec<ImageOption>,
    correct_image_label: String,
  },
}

/// Discriminant of `QuestionBody`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
  MultipleChoiceSingle,
  MultipleChoiceMultiple,
  FillInBlank,
  Spelling,
  Audio,
  Translation,
  Matching,
  WordBank,
  ImageChoice,
}

impl QuestionKind {
  pub fn as_str(self) -> &'static str {
    match self {
      QuestionKind::MultipleChoiceSingle => "multiple_choice_single",
      QuestionKind::MultipleChoiceMultiple => "multiple_choice_multiple",
      QuestionKind::FillInBlank => "fill_in_blank",
      QuestionKind::Spelling => "spelling",
      QuestionKind::Audio => "audio",
      QuestionKind::Translation => "translation",
      QuestionKind::Matching => "matching",
      QuestionKind::WordBank => "word_bank",
      QuestionKind::ImageChoice => "image_choice",
    }
  }
}

impl std::fmt::Display for QuestionKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl QuestionBody {
  pub fn kind(&self) -> QuestionKind {
    match self {
      QuestionBody::MultipleChoiceSingle { .. } => QuestionKind::MultipleChoiceSingle,
      QuestionBody::MultipleChoiceMultiple { .. } => QuestionKind::MultipleChoiceMultiple,
      QuestionBody::FillInBlank { .. } => QuestionKind::FillInBlank,
      QuestionBody::Spelling { .. } => QuestionKind::Spelling,
      QuestionBody::Audio { .. } => QuestionKind::Audio,
      QuestionBody::Translation { .. } => QuestionKind::Translation,
      QuestionBody::Matching { .. } => QuestionKind::Matching,
      QuestionBody::WordBank { .. } => QuestionKind::WordBank,
      QuestionBody::ImageChoice { .. } => QuestionKind::ImageChoice,
    }
  }

  /// Audio reference the widget plays, if any.
  pub fn audio_url(&self) -> Option<&str> {
    match self {
      QuestionBody::Audio { audio_url, .. } => Some(audio_url),
      QuestionBody::Spelling { audio_url, .. } => audio_url.as_deref(),
      _ => None,
    }
  }
}

/// A question record as hosted by a lesson.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
  pub id: String,
  #[serde(flatten)]
  pub body: QuestionBody,
  #[serde(default)]
  pub options: CheckOptions,
}

impl Question {
  pub fn kind(&self) -> QuestionKind { self.body.kind() }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonType {
  Listening,
  Reading,
  #[default]
  Quiz,
  Speaking,
}

/// A grade and the subjects offered for it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Grade {
  pub id: String,
  pub label: String,
  #[serde(default)] pub subjects: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LessonSummary {
  pub id: String,
  pub slug: String,
  pub name: String,
  #[serde(default)] pub lesson_type: LessonType,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Chapter {
  pub number: u32,
  pub name: String,
  #[serde(default)] pub lessons: Vec<LessonSummary>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Course {
  pub slug: String,
  pub title: String,
  pub grade: String,
  pub subject: String,
  #[serde(default)] pub chapters: Vec<Chapter>,
}

/// Ordered question sequence behind one lesson page.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lesson {
  pub id: String,
  pub slug: String,
  pub name: String,
  #[serde(default)] pub lesson_type: LessonType,
  #[serde(default)] pub questions: Vec<Question>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn question_record_parses_with_flattened_kind_tag() {
    let json = r#"{
      "id": "q1",
      "type": "multiple_choice_multiple",
      "question": "Which of the following are fruits?",
      "choices": ["Carrot", "Apple", "Banana"],
      "correct_answers": ["Apple", "Banana"]
    }"#;
    let q: Question = serde_json::from_str(json).unwrap();
    assert_eq!(q.id, "q1");
    assert_eq!(q.kind(), QuestionKind::MultipleChoiceMultiple);
    assert_eq!(q.options, CheckOptions::default());
  }

  #[test]
  fn fill_in_blank_accepts_question_alias() {
    let json = r#"{"id":"q2","type":"fill_in_blank","question":"The _____ is yellow.","correct_answer":"banana"}"#;
    let q: Question = serde_json::from_str(json).unwrap();
    match q.body {
      QuestionBody::FillInBlank { sentence, .. } => assert_eq!(sentence, "The _____ is yellow."),
      other => panic!("unexpected body: {other:?}"),
    }
  }

  #[test]
  fn audio_url_only_for_audio_kinds() {
    let audio = QuestionBody::Audio { audio_url: "a.mp3".into(), correct_answer: "hi".into(), instruction: None };
    let spelling = QuestionBody::Spelling { correct_spelling: "cat".into(), word: Some("cat".into()), audio_url: None, instruction: None };
    assert_eq!(audio.audio_url(), Some("a.mp3"));
    assert_eq!(spelling.audio_url(), None);
    assert_eq!(QuestionKind::WordBank.to_string(), "word_bank");
  }
}

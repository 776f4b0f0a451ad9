//! Loading the lesson bank (grades, courses, lessons with questions) from TOML.
//!
//! Example:
//!
//! ```toml
//! [[grades]]
//! id = "grade5"
//! label = "Grade 5"
//! subjects = ["English"]
//!
//! [[lessons]]
//! id = "lsn100"
//! slug = "colors"
//! name = "Colors"
//! lesson_type = "quiz"
//!
//! [[lessons.questions]]
//! type = "translation"
//! sentence = "أحمر"
//! correct_answer = "red"
//! options = { acceptable_variations = ["the color red"] }
//! ```

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{CheckOptions, Course, Grade, LessonType, QuestionBody};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct LessonBank {
  #[serde(default)]
  pub grades: Vec<Grade>,
  #[serde(default)]
  pub courses: Vec<Course>,
  #[serde(default)]
  pub lessons: Vec<LessonCfg>,
}

/// Lesson entry accepted in TOML. Question ids are optional here and get a
/// generated id when missing. Questions stay raw until `questions()` so one
/// bad entry does not reject the whole bank.
#[derive(Clone, Debug, Deserialize)]
pub struct LessonCfg {
  #[serde(default)] pub id: Option<String>,
  pub slug: String,
  pub name: String,
  #[serde(default)] pub lesson_type: LessonType,
  #[serde(default)] pub questions: Vec<toml::Value>,
}

impl LessonCfg {
  pub fn questions(&self) -> impl Iterator<Item = Result<QuestionCfg, toml::de::Error>> + '_ {
    self.questions.iter().cloned().map(toml::Value::try_into)
  }
}

#[derive(Clone, Debug, Deserialize)]
pub struct QuestionCfg {
  #[serde(default)] pub id: Option<String>,
  #[serde(flatten)] pub body: QuestionBody,
  #[serde(default)] pub options: CheckOptions,
}

pub fn parse_lesson_bank(text: &str) -> Result<LessonBank, toml::de::Error> {
  toml::from_str::<LessonBank>(text)
}

/// Attempt to load `LessonBank` from LESSON_BANK_PATH. On any parsing/IO error, returns None.
pub fn load_lesson_bank_from_env() -> Option<LessonBank> {
  let path = std::env::var("LESSON_BANK_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_lesson_bank(&s) {
      Ok(bank) => {
        info!(target: "lesson_quiz", %path, grades = bank.grades.len(), courses = bank.courses.len(), lessons = bank.lessons.len(), "Loaded lesson bank (TOML)");
        Some(bank)
      }
      Err(e) => {
        error!(target: "lesson_quiz", %path, error = %e, "Failed to parse TOML lesson bank");
        None
      }
    },
    Err(e) => {
      error!(target: "lesson_quiz", %path, error = %e, "Failed to read TOML lesson bank file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::QuestionKind;

  #[test]
  fn parses_a_bank_with_mixed_question_kinds() {
    let text = r#"
      [[grades]]
      id = "grade5"
      label = "Grade 5"
      subjects = ["English"]

      [[courses]]
      slug = "colors-course"
      title = "Colors"
      grade = "grade5"
      subject = "English"

      [[courses.chapters]]
      number = 1
      name = "Colors"
      lessons = [{ id = "lsn100", slug = "colors", name = "Colors" }]

      [[lessons]]
      id = "lsn100"
      slug = "colors"
      name = "Colors"
      lesson_type = "reading"

      [[lessons.questions]]
      id = "c1"
      type = "translation"
      sentence = "أحمر"
      correct_answer = "red"
      options = { acceptable_variations = ["the color red"] }

      [[lessons.questions]]
      type = "matching"
      pairs = [{ left = "red", right = "أحمر" }, { left = "blue", right = "أزرق" }]
    "#;
    let bank = parse_lesson_bank(text).unwrap();
    assert_eq!(bank.grades[0].subjects, vec!["English".to_string()]);
    assert_eq!(bank.courses[0].chapters[0].lessons[0].slug, "colors");

    let lesson = &bank.lessons[0];
    assert_eq!(lesson.lesson_type, LessonType::Reading);
    let questions: Vec<QuestionCfg> = lesson.questions().collect::<Result<_, _>>().unwrap();
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].body.kind(), QuestionKind::Translation);
    assert_eq!(questions[0].options.acceptable_variations, vec!["the color red".to_string()]);
    assert!(!questions[0].options.case_sensitive);
    assert_eq!(questions[1].id, None);
    assert_eq!(questions[1].body.kind(), QuestionKind::Matching);
  }

  #[test]
  fn unknown_question_type_fails_only_that_question() {
    let text = r#"
      [[lessons]]
      slug = "x"
      name = "X"
      [[lessons.questions]]
      type = "essay"
      prompt = "Write"
      [[lessons.questions]]
      type = "word_bank"
      words = ["b", "a"]
      correct_order = ["a", "b"]
    "#;
    let bank = parse_lesson_bank(text).unwrap();
    let parsed: Vec<_> = bank.lessons[0].questions().collect();
    assert!(parsed[0].is_err());
    assert!(parsed[1].is_ok());
  }
}

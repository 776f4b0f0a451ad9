//! Application state: the read-only lesson catalog served to every connection.
//!
//! This module owns:
//!   - grades with their offered subjects
//!   - courses (chapters + lesson summaries), filterable by grade/subject
//!   - lessons by slug, each an ordered question sequence
//!
//! The catalog is built once at startup from the optional TOML bank plus the
//! built-in seeds. Bank entries win on id/slug collision. Interaction state is
//! never stored here; it lives in each connection's `LessonSession`.

use std::collections::{HashMap, HashSet};

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::{load_lesson_bank_from_env, LessonBank};
use crate::domain::{Course, Grade, Lesson, Question, QuestionBody};
use crate::seeds::{seed_courses, seed_grades, seed_lessons};

#[derive(Clone, Debug, Default)]
pub struct AppState {
  pub grades: Vec<Grade>,
  pub courses: Vec<Course>,
  pub lessons_by_slug: HashMap<String, Lesson>,
}

impl AppState {
  /// Build state from env: load the lesson bank, merge seeds, build indices.
  #[instrument(level = "info", skip_all)]
  pub fn new() -> Self {
    let state = Self::from_bank(load_lesson_bank_from_env());
    info!(
      target: "lesson_quiz",
      grades = state.grades.len(),
      courses = state.courses.len(),
      lessons = state.lessons_by_slug.len(),
      "Startup catalog inventory"
    );
    state
  }

  pub fn from_bank(bank: Option<LessonBank>) -> Self {
    let mut grades: Vec<Grade> = Vec::new();
    let mut courses: Vec<Course> = Vec::new();
    let mut lessons_by_slug: HashMap<String, Lesson> = HashMap::new();

    if let Some(bank) = bank {
      for g in bank.grades {
        if grades.iter().any(|x| x.id == g.id) {
          error!(target: "lesson_quiz", grade = %g.id, "Skipping bank grade: duplicate id.");
          continue;
        }
        grades.push(g);
      }
      for c in bank.courses {
        if courses.iter().any(|x| x.slug == c.slug) {
          error!(target: "lesson_quiz", course = %c.slug, "Skipping bank course: duplicate slug.");
          continue;
        }
        courses.push(c);
      }
      for l in bank.lessons {
        if l.slug.trim().is_empty() {
          error!(target: "lesson_quiz", name = %l.name, "Skipping bank lesson: empty slug.");
          continue;
        }
        if lessons_by_slug.contains_key(&l.slug) {
          error!(target: "lesson_quiz", lesson = %l.slug, "Skipping bank lesson: duplicate slug.");
          continue;
        }

        let mut seen_ids = HashSet::new();
        let mut questions = Vec::with_capacity(l.questions.len());
        for (index, parsed) in l.questions().enumerate() {
          let qc = match parsed {
            Ok(qc) => qc,
            Err(e) => {
              error!(target: "lesson_quiz", lesson = %l.slug, index, error = %e, "Skipping bank question: malformed.");
              continue;
            }
          };
          let id = qc.id.unwrap_or_else(|| Uuid::new_v4().to_string());
          if !seen_ids.insert(id.clone()) {
            error!(target: "lesson_quiz", lesson = %l.slug, %id, "Skipping bank question: duplicate id in lesson.");
            continue;
          }
          let q = Question { id, body: qc.body, options: qc.options };
          warn_if_malformed(&l.slug, &q);
          questions.push(q);
        }

        let lesson = Lesson {
          id: l.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
          slug: l.slug.clone(),
          name: l.name,
          lesson_type: l.lesson_type,
          questions,
        };
        lessons_by_slug.insert(l.slug, lesson);
      }
    }

    // Always merge built-in seeds, but don't overwrite bank entries.
    for g in seed_grades() {
      if !grades.iter().any(|x| x.id == g.id) {
        grades.push(g);
      }
    }
    for c in seed_courses() {
      if !courses.iter().any(|x| x.slug == c.slug) {
        courses.push(c);
      }
    }
    for l in seed_lessons() {
      lessons_by_slug.entry(l.slug.clone()).or_insert(l);
    }

    for c in &courses {
      if !grades.iter().any(|g| g.id == c.grade && g.subjects.contains(&c.subject)) {
        warn!(target: "lesson_quiz", course = %c.slug, grade = %c.grade, subject = %c.subject, "Course grade/subject is not offered by any grade");
      }
      for ch in &c.chapters {
        for ls in &ch.lessons {
          if !lessons_by_slug.contains_key(&ls.slug) {
            warn!(target: "lesson_quiz", course = %c.slug, lesson = %ls.slug, "Course lists a lesson with no content");
          }
        }
      }
    }

    Self { grades, courses, lessons_by_slug }
  }

  pub fn grade(&self, id: &str) -> Option<&Grade> {
    self.grades.iter().find(|g| g.id == id)
  }

  /// Courses for an optional grade and subject filter.
  #[instrument(level = "debug", skip(self))]
  pub fn courses_for(&self, grade: Option<&str>, subject: Option<&str>) -> Vec<&Course> {
    self
      .courses
      .iter()
      .filter(|c| grade.map_or(true, |g| c.grade == g))
      .filter(|c| subject.map_or(true, |s| c.subject == s))
      .collect()
  }

  pub fn course(&self, slug: &str) -> Option<&Course> {
    self.courses.iter().find(|c| c.slug == slug)
  }

  #[instrument(level = "debug", skip(self), fields(%slug))]
  pub fn lesson(&self, slug: &str) -> Option<&Lesson> {
    self.lessons_by_slug.get(slug)
  }
}

/// Malformed questions still load; widgets degrade at render time. Log so
/// authors can fix the bank.
fn warn_if_malformed(lesson: &str, q: &Question) {
  let problem = match &q.body {
    QuestionBody::MultipleChoiceSingle { choices, correct_answer, .. } if !choices.contains(correct_answer) => {
      Some("correct_answer is not one of the choices")
    }
    QuestionBody::MultipleChoiceMultiple { choices, correct_answers, .. }
      if correct_answers.is_empty() || !correct_answers.iter().all(|a| choices.contains(a)) =>
    {
      Some("correct_answers must be a non-empty subset of choices")
    }
    QuestionBody::ImageChoice { image_choices, correct_image_label, .. }
      if !image_choices.iter().any(|c| c.label == *correct_image_label) =>
    {
      Some("correct_image_label matches no image")
    }
    QuestionBody::WordBank { words, correct_order } if {
      let mut a = words.clone();
      let mut b = correct_order.clone();
      a.sort();
      b.sort();
      a != b
    } => Some("correct_order is not a permutation of words"),
    QuestionBody::Matching { pairs } if pairs.is_empty() => Some("no pairs"),
    QuestionBody::Spelling { correct_spelling, .. } if !correct_spelling.chars().all(char::is_alphabetic) => {
      Some("correct_spelling has non-letter characters")
    }
    QuestionBody::FillInBlank { correct_answer, .. }
    | QuestionBody::Audio { correct_answer, .. }
    | QuestionBody::Translation { correct_answer, .. }
      if correct_answer.trim().is_empty() =>
    {
      Some("empty correct_answer")
    }
    _ => None,
  };
  if let Some(problem) = problem {
    warn!(target: "lesson_quiz", %lesson, id = %q.id, kind = %q.kind(), problem, "Malformed question");
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::parse_lesson_bank;

  #[test]
  fn seeds_only_catalog() {
    let state = AppState::from_bank(None);
    assert_eq!(state.grades.len(), 4);
    assert_eq!(state.grade("grade2").unwrap().subjects, vec!["Science".to_string(), "Arabic".to_string()]);
    assert!(state.lesson("fruits-basics").is_some());
    assert!(state.lesson("nope").is_none());
  }

  #[test]
  fn bank_entries_win_and_missing_ids_are_generated() {
    let bank = parse_lesson_bank(
      r#"
      [[lessons]]
      slug = "fruits-basics"
      name = "Fruits (bank)"
      [[lessons.questions]]
      type = "fill_in_blank"
      sentence = "An ____ a day."
      correct_answer = "apple"
      [[lessons.questions]]
      id = "dup"
      type = "audio"
      audio_url = "/a.mp3"
      correct_answer = "a"
      [[lessons.questions]]
      id = "dup"
      type = "audio"
      audio_url = "/b.mp3"
      correct_answer = "b"
      [[lessons.questions]]
      type = "audio"
      correct_answer = "no url"
    "#,
    )
    .unwrap();
    let state = AppState::from_bank(Some(bank));
    let lesson = state.lesson("fruits-basics").unwrap();
    assert_eq!(lesson.name, "Fruits (bank)");
    assert_eq!(lesson.questions.len(), 2);
    assert!(!lesson.questions[0].id.is_empty());
    assert_eq!(lesson.questions[1].id, "dup");
    // seeds still fill what the bank does not cover
    assert!(state.lesson("animals-basics").is_some());
  }

  #[test]
  fn courses_filter_by_grade_and_subject() {
    let state = AppState::from_bank(None);
    assert_eq!(state.courses_for(Some("grade1"), Some("English")).len(), 1);
    assert_eq!(state.courses_for(Some("grade1"), Some("Math")).len(), 0);
    assert_eq!(state.courses_for(None, None).len(), state.courses.len());
    assert!(state.course("english-basics").is_some());
  }
}

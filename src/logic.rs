//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Projecting questions into prompt-only views
//!   - Snapshotting mounted interactions
//!   - Catalog lookups (courses, lesson previews) and profile views
//!   - Applying a session operation and collecting the messages it produces

use tracing::{debug, info, instrument};

use crate::domain::{Course, Lesson, QuestionBody};
use crate::interaction::feedback::sentence_layout;
use crate::interaction::{Interaction, SubmitResult};
use crate::protocol::{InteractionOut, LessonOut, PromptOut, QuestionOut, RejectReason, ServerWsMessage};
use crate::session::{LessonSession, MountedLesson, SessionError, SessionProfile};
use crate::state::AppState;

pub fn question_out(it: &Interaction) -> QuestionOut {
  let prompt = match &it.question().body {
    QuestionBody::MultipleChoiceSingle { question, choices, .. } => {
      PromptOut::MultipleChoiceSingle { question: question.clone(), choices: choices.clone() }
    }
    QuestionBody::MultipleChoiceMultiple { question, choices, .. } => {
      PromptOut::MultipleChoiceMultiple { question: question.clone(), choices: choices.clone() }
    }
    QuestionBody::FillInBlank { sentence, .. } => {
      PromptOut::FillInBlank { sentence: sentence.clone(), layout: sentence_layout(sentence) }
    }
    QuestionBody::Spelling { correct_spelling, word, audio_url, instruction } => PromptOut::Spelling {
      word: word.clone(),
      audio_url: audio_url.clone(),
      instruction: instruction.clone(),
      letters: correct_spelling.chars().count(),
    },
    QuestionBody::Audio { audio_url, instruction, .. } => {
      PromptOut::Audio { audio_url: audio_url.clone(), instruction: instruction.clone() }
    }
    QuestionBody::Translation { sentence, source_language, target_language, .. } => PromptOut::Translation {
      sentence: sentence.clone(),
      source_language: source_language.clone(),
      target_language: target_language.clone(),
    },
    QuestionBody::Matching { pairs } => PromptOut::Matching {
      left_items: pairs.iter().map(|p| p.left.clone()).collect(),
      right_items: it.right_items().to_vec(),
    },
    QuestionBody::WordBank { words, .. } => PromptOut::WordBank { words: words.clone() },
    QuestionBody::ImageChoice { word, image_choices, .. } => {
      PromptOut::ImageChoice { word: word.clone(), image_choices: image_choices.clone() }
    }
  };
  QuestionOut { id: it.id().to_string(), prompt }
}

pub fn snapshot(it: &Interaction) -> InteractionOut {
  InteractionOut {
    question_id: it.id().to_string(),
    kind: it.kind(),
    response: it.response().clone(),
    phase: it.phase(),
    outcome: it.outcome(),
    can_submit: it.can_submit(),
    feedback: it.feedback(),
    audio: it.audio(),
    failed_resources: it.failed_resources().iter().cloned().collect(),
  }
}

pub fn lesson_out(mounted: &MountedLesson) -> LessonOut {
  LessonOut {
    slug: mounted.slug.clone(),
    name: mounted.name.clone(),
    lesson_type: mounted.lesson_type,
    questions: mounted.interactions.iter().map(question_out).collect(),
  }
}

/// Prompt-only view of a lesson outside any session.
pub fn lesson_preview(lesson: &Lesson) -> LessonOut {
  let interactions: Vec<Interaction> = lesson.questions.iter().cloned().map(Interaction::mount).collect();
  LessonOut {
    slug: lesson.slug.clone(),
    name: lesson.name.clone(),
    lesson_type: lesson.lesson_type,
    questions: interactions.iter().map(question_out).collect(),
  }
}

#[instrument(level = "debug", skip(state))]
pub fn list_courses(state: &AppState, grade: Option<&str>, subject: Option<&str>) -> Vec<Course> {
  let courses: Vec<Course> = state.courses_for(grade, subject).into_iter().cloned().collect();
  debug!(target: "lesson_quiz", count = courses.len(), "Courses listed");
  courses
}

pub fn profile_message(profile: &SessionProfile, state: &AppState) -> ServerWsMessage {
  let subjects = profile
    .grade()
    .and_then(|id| state.grade(id))
    .map(|g| g.subjects.clone())
    .unwrap_or_default();
  ServerWsMessage::Profile {
    grade: profile.grade().map(str::to_string),
    subject: profile.subject().map(str::to_string),
    subjects,
  }
}

/// Snapshot of `question_id` followed by any answer reports the operation
/// emitted. Reports are relayed and logged, never stored.
pub fn after_question_op(session: &mut LessonSession, question_id: &str) -> Result<Vec<ServerWsMessage>, SessionError> {
  let mut out = vec![ServerWsMessage::Interaction { interaction: snapshot(session.interaction(question_id)?) }];
  for report in session.take_reports() {
    info!(target: "lesson_quiz", id = %report.question_id, kind = %report.kind, correct = report.correct, "Answer reported");
    out.push(ServerWsMessage::Answer { report });
  }
  Ok(out)
}

/// Messages for a submit attempt: rejection when nothing was accepted.
pub fn submit_question(session: &mut LessonSession, question_id: &str) -> Result<Vec<ServerWsMessage>, SessionError> {
  let reason = match session.submit(question_id)? {
    SubmitResult::Accepted { .. } => None,
    SubmitResult::NotAnswerable => Some(RejectReason::NotAnswerable),
    SubmitResult::AlreadySubmitted => Some(RejectReason::AlreadySubmitted),
  };
  let mut out = after_question_op(session, question_id)?;
  if let Some(reason) = reason {
    debug!(target: "lesson_quiz", id = %question_id, ?reason, "Submit rejected");
    out.insert(0, ServerWsMessage::Rejected { question_id: question_id.to_string(), reason });
  }
  Ok(out)
}

/// Mount a lesson by slug: the lesson view plus one snapshot per question.
#[instrument(level = "info", skip(state, session))]
pub fn mount_lesson(state: &AppState, session: &mut LessonSession, slug: &str) -> Result<Vec<ServerWsMessage>, SessionError> {
  let lesson = state.lesson(slug).ok_or_else(|| SessionError::UnknownLesson(slug.to_string()))?;
  let mounted = session.mount(lesson);
  let mut out = vec![ServerWsMessage::Lesson { lesson: Some(lesson_out(mounted)) }];
  out.extend(mounted.interactions.iter().map(|it| ServerWsMessage::Interaction { interaction: snapshot(it) }));
  Ok(out)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::interaction::ResponseInput;

  #[test]
  fn views_never_carry_canonical_answers() {
    let state = AppState::from_bank(None);
    for lesson in state.lessons_by_slug.values() {
      let json = serde_json::to_string(&lesson_preview(lesson)).unwrap();
      assert!(!json.contains("correct_"), "leaked answer in {}", lesson.slug);
      assert!(!json.contains("acceptable_variations"));
    }
    let fruits = serde_json::to_value(lesson_preview(state.lesson("fruits-basics").unwrap())).unwrap();
    assert_eq!(fruits["lessonType"], "quiz");
    assert_eq!(fruits["questions"][1]["type"], "fill_in_blank");
    assert_eq!(fruits["questions"][1]["layout"]["layout"], "with_blank");
  }

  #[test]
  fn mount_sends_lesson_then_snapshots() {
    let state = AppState::from_bank(None);
    let mut session = LessonSession::new();
    let out = mount_lesson(&state, &mut session, "animals-basics").unwrap();
    assert_eq!(out.len(), 4);
    assert!(matches!(out[0], ServerWsMessage::Lesson { lesson: Some(_) }));
    assert!(matches!(
      mount_lesson(&state, &mut session, "missing"),
      Err(SessionError::UnknownLesson(_))
    ));
  }

  #[test]
  fn submit_relays_report_or_rejection() {
    let state = AppState::from_bank(None);
    let mut session = LessonSession::new();
    mount_lesson(&state, &mut session, "fruits-basics").unwrap();

    let out = submit_question(&mut session, "q2").unwrap();
    assert!(matches!(out[0], ServerWsMessage::Rejected { reason: RejectReason::NotAnswerable, .. }));

    session.record("q2", ResponseInput::SetText { text: "Banana".into() }).unwrap();
    let out = submit_question(&mut session, "q2").unwrap();
    assert_eq!(out.len(), 2);
    assert!(matches!(&out[1], ServerWsMessage::Answer { report } if report.correct));

    let out = submit_question(&mut session, "q2").unwrap();
    assert!(matches!(out[0], ServerWsMessage::Rejected { reason: RejectReason::AlreadySubmitted, .. }));
  }

  #[test]
  fn profile_lists_subjects_of_selected_grade() {
    let state = AppState::from_bank(None);
    let mut profile = SessionProfile::default();
    profile.select_grade(&state.grades, "grade4").unwrap();
    let ServerWsMessage::Profile { subjects, subject, .. } = profile_message(&profile, &state) else {
      panic!("wrong message")
    };
    assert_eq!(subjects, vec!["Geography".to_string(), "Islamic Studies".to_string()]);
    assert_eq!(subject, None);
  }
}

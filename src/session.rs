//! Per-connection host state: the learner's grade/subject profile and the
//! currently mounted lesson with one `Interaction` per question.
//!
//! Nothing here outlives the connection. Answer reports emitted by the
//! interactions are queued and handed to the caller via `take_reports`.

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{Grade, Lesson, LessonType};
use crate::interaction::{
  AnswerReport, AudioEvent, Interaction, InteractionError, Recorded, ResponseInput, SubmitResult,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
  #[error("unknown grade `{0}`")]
  UnknownGrade(String),

  #[error("select a grade first")]
  NoGradeSelected,

  #[error("subject `{subject}` is not offered for {grade}")]
  SubjectNotOffered { grade: String, subject: String },

  #[error("unknown lesson `{0}`")]
  UnknownLesson(String),

  #[error("no lesson is mounted")]
  NoLessonMounted,

  #[error("question `{0}` is not part of the mounted lesson")]
  UnknownQuestion(String),

  #[error(transparent)]
  Interaction(#[from] InteractionError),
}

/// Grade and subject picked by the learner.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionProfile {
  grade: Option<String>,
  subject: Option<String>,
}

impl SessionProfile {
  pub fn grade(&self) -> Option<&str> { self.grade.as_deref() }
  pub fn subject(&self) -> Option<&str> { self.subject.as_deref() }

  /// Pick a grade. A previously chosen subject survives only if the new
  /// grade still offers it.
  pub fn select_grade(&mut self, grades: &[Grade], id: &str) -> Result<(), SessionError> {
    let grade = grades
      .iter()
      .find(|g| g.id == id)
      .ok_or_else(|| SessionError::UnknownGrade(id.to_string()))?;
    if let Some(subject) = &self.subject {
      if !grade.subjects.contains(subject) {
        debug!(target: "lesson_quiz", grade = %id, %subject, "Clearing subject not offered by new grade");
        self.subject = None;
      }
    }
    self.grade = Some(grade.id.clone());
    Ok(())
  }

  pub fn select_subject(&mut self, grades: &[Grade], subject: &str) -> Result<(), SessionError> {
    let grade_id = self.grade.as_deref().ok_or(SessionError::NoGradeSelected)?;
    let offered = grades
      .iter()
      .find(|g| g.id == grade_id)
      .map_or(false, |g| g.subjects.iter().any(|s| s == subject));
    if !offered {
      return Err(SessionError::SubjectNotOffered { grade: grade_id.to_string(), subject: subject.to_string() });
    }
    self.subject = Some(subject.to_string());
    Ok(())
  }
}

#[derive(Clone, Debug)]
pub struct MountedLesson {
  pub slug: String,
  pub name: String,
  pub lesson_type: LessonType,
  pub interactions: Vec<Interaction>,
}

#[derive(Debug, Default)]
pub struct LessonSession {
  pub profile: SessionProfile,
  lesson: Option<MountedLesson>,
  pending: Vec<AnswerReport>,
}

fn find_mut<'a>(lesson: &'a mut Option<MountedLesson>, id: &str) -> Result<&'a mut Interaction, SessionError> {
  lesson
    .as_mut()
    .ok_or(SessionError::NoLessonMounted)?
    .interactions
    .iter_mut()
    .find(|it| it.id() == id)
    .ok_or_else(|| SessionError::UnknownQuestion(id.to_string()))
}

impl LessonSession {
  pub fn new() -> Self { Self::default() }

  /// Mount `lesson`, replacing whatever was mounted. All prior interaction
  /// state is discarded.
  pub fn mount(&mut self, lesson: &Lesson) -> &MountedLesson {
    let interactions = lesson.questions.iter().cloned().map(Interaction::mount).collect::<Vec<_>>();
    info!(target: "lesson_quiz", lesson = %lesson.slug, questions = interactions.len(), "Lesson mounted");
    self.pending.clear();
    self.lesson.insert(MountedLesson {
      slug: lesson.slug.clone(),
      name: lesson.name.clone(),
      lesson_type: lesson.lesson_type,
      interactions,
    })
  }

  /// Drop the mounted lesson, returning its slug.
  pub fn unmount(&mut self) -> Option<String> {
    self.pending.clear();
    let slug = self.lesson.take().map(|l| l.slug);
    if let Some(slug) = &slug {
      info!(target: "lesson_quiz", lesson = %slug, "Lesson unmounted");
    }
    slug
  }

  pub fn interaction(&self, id: &str) -> Result<&Interaction, SessionError> {
    self
      .lesson
      .as_ref()
      .ok_or(SessionError::NoLessonMounted)?
      .interactions
      .iter()
      .find(|it| it.id() == id)
      .ok_or_else(|| SessionError::UnknownQuestion(id.to_string()))
  }

  pub fn record(&mut self, id: &str, input: ResponseInput) -> Result<Recorded, SessionError> {
    let pending = &mut self.pending;
    let it = find_mut(&mut self.lesson, id)?;
    let mut sink = |r: AnswerReport| pending.push(r);
    Ok(it.record(input, &mut sink)?)
  }

  pub fn submit(&mut self, id: &str) -> Result<SubmitResult, SessionError> {
    let pending = &mut self.pending;
    let it = find_mut(&mut self.lesson, id)?;
    let mut sink = |r: AnswerReport| pending.push(r);
    Ok(it.submit(&mut sink))
  }

  pub fn reset(&mut self, id: &str) -> Result<(), SessionError> {
    find_mut(&mut self.lesson, id)?.reset();
    Ok(())
  }

  pub fn audio(&mut self, id: &str, event: AudioEvent) -> Result<Recorded, SessionError> {
    Ok(find_mut(&mut self.lesson, id)?.audio_event(event)?)
  }

  pub fn resource_failed(&mut self, id: &str, url: &str) -> Result<Recorded, SessionError> {
    Ok(find_mut(&mut self.lesson, id)?.resource_failed(url)?)
  }

  /// Reports emitted since the last call, oldest first.
  pub fn take_reports(&mut self) -> Vec<AnswerReport> {
    std::mem::take(&mut self.pending)
  }
}

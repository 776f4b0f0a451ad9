//! HTTP endpoint handlers. These are thin wrappers over the catalog in
//! `AppState` and the shared view builders in `logic`.

use std::sync::Arc;
use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument, warn};

use crate::logic::{lesson_preview, list_courses};
use crate::protocol::*;
use crate::state::AppState;

fn not_found(what: &str, slug: &str) -> Response {
  warn!(target: "lesson_quiz", %what, %slug, "HTTP lookup miss");
  (StatusCode::NOT_FOUND, Json(ErrorOut { error: format!("unknown {}: {}", what, slug) })).into_response()
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_grades(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(GradesOut { grades: state.grades.clone() })
}

#[instrument(level = "info", skip(state), fields(grade = ?q.grade, subject = ?q.subject))]
pub async fn http_get_courses(
  State(state): State<Arc<AppState>>,
  Query(q): Query<CoursesQuery>,
) -> impl IntoResponse {
  let courses = list_courses(&state, q.grade.as_deref(), q.subject.as_deref());
  info!(target: "lesson_quiz", count = courses.len(), "HTTP courses served");
  Json(CoursesOut { courses })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_course(State(state): State<Arc<AppState>>, Path(slug): Path<String>) -> Response {
  match state.course(&slug) {
    Some(course) => Json(course.clone()).into_response(),
    None => not_found("course", &slug),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_lesson(State(state): State<Arc<AppState>>, Path(slug): Path<String>) -> Response {
  match state.lesson(&slug) {
    Some(lesson) => {
      info!(target: "lesson_quiz", %slug, questions = lesson.questions.len(), "HTTP lesson served");
      Json(lesson_preview(lesson)).into_response()
    }
    None => not_found("lesson", &slug),
  }
}

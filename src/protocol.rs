//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Question views carry prompts only; canonical answers never leave the server
//! except as the `expected` text revealed in feedback after a wrong submission.

use serde::{Deserialize, Serialize};

use crate::domain::{Course, Grade, ImageOption, LessonType, QuestionKind};
use crate::interaction::{AnswerReport, AudioEvent, AudioStatus, Feedback, Phase, Response, ResponseInput, SentenceLayout};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    SelectGrade {
        grade: String,
    },
    SelectSubject {
        subject: String,
    },
    MountLesson {
        #[serde(rename = "lessonSlug")]
        lesson_slug: String,
    },
    UnmountLesson,
    Record {
        #[serde(rename = "questionId")]
        question_id: String,
        input: ResponseInput,
    },
    Submit {
        #[serde(rename = "questionId")]
        question_id: String,
    },
    Reset {
        #[serde(rename = "questionId")]
        question_id: String,
    },
    Audio {
        #[serde(rename = "questionId")]
        question_id: String,
        event: AudioEvent,
    },
    ResourceFailed {
        #[serde(rename = "questionId")]
        question_id: String,
        url: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Profile {
        grade: Option<String>,
        subject: Option<String>,
        /// Subjects offered for the selected grade.
        subjects: Vec<String>,
    },
    /// `null` after unmount.
    Lesson {
        lesson: Option<LessonOut>,
    },
    Interaction {
        interaction: InteractionOut,
    },
    Answer {
        report: AnswerReport,
    },
    Rejected {
        #[serde(rename = "questionId")]
        question_id: String,
        reason: RejectReason,
    },
    Error {
        message: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    NotAnswerable,
    AlreadySubmitted,
}

/// Prompt-only view of one question, per kind.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromptOut {
    MultipleChoiceSingle {
        question: String,
        choices: Vec<String>,
    },
    MultipleChoiceMultiple {
        question: String,
        choices: Vec<String>,
    },
    FillInBlank {
        sentence: String,
        layout: SentenceLayout,
    },
    #[serde(rename_all = "camelCase")]
    Spelling {
        word: Option<String>,
        audio_url: Option<String>,
        instruction: Option<String>,
        /// Number of letter slots.
        letters: usize,
    },
    #[serde(rename_all = "camelCase")]
    Audio {
        audio_url: String,
        instruction: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Translation {
        sentence: String,
        source_language: Option<String>,
        target_language: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Matching {
        left_items: Vec<String>,
        /// Shuffled once per mount.
        right_items: Vec<String>,
    },
    WordBank {
        words: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    ImageChoice {
        word: String,
        image_choices: Vec<ImageOption>,
    },
}

#[derive(Debug, Serialize)]
pub struct QuestionOut {
    pub id: String,
    #[serde(flatten)]
    pub prompt: PromptOut,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonOut {
    pub slug: String,
    pub name: String,
    pub lesson_type: LessonType,
    pub questions: Vec<QuestionOut>,
}

/// Snapshot of one mounted interaction.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionOut {
    pub question_id: String,
    pub kind: QuestionKind,
    pub response: Response,
    pub phase: Phase,
    pub outcome: Option<bool>,
    pub can_submit: bool,
    pub feedback: Feedback,
    pub audio: AudioStatus,
    pub failed_resources: Vec<String>,
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct GradesOut {
    pub grades: Vec<Grade>,
}

#[derive(Debug, Deserialize)]
pub struct CoursesQuery {
    pub grade: Option<String>,
    pub subject: Option<String>,
}

#[derive(Serialize)]
pub struct CoursesOut {
    pub courses: Vec<Course>,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
}

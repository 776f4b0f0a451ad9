//! Visual feedback as a pure projection of (question, response, phase).
//!
//! Nothing here reads or writes interaction state beyond its arguments, so any
//! view layer recomputing it gets the same marks.

use serde::Serialize;

use crate::domain::{MatchPair, Question, QuestionBody};

use super::response::Response;
use super::rules::{matched_translation, rules_for};
use super::Phase;

/// Minimum run of underscores treated as the blank in a fill-in-blank sentence.
const BLANK_MIN_RUN: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mark {
  Idle,
  Selected,
  Pending,
  Correct,
  Incorrect,
  /// Correct option the learner did not pick.
  Missed,
  /// Empty spelling slot at submission.
  Missing,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LabelMark {
  pub label: String,
  pub mark: Mark,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PairMark {
  pub left: String,
  pub right: String,
  pub mark: Mark,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Feedback {
  Choices { marks: Vec<LabelMark> },
  Text {
    mark: Mark,
    /// Canonical answer, revealed after an incorrect submission.
    expected: Option<String>,
    /// Accepted answer a correct translation matched.
    matched: Option<String>,
  },
  /// `expected` fields carry the canonical answer after an incorrect submission.
  Letters { marks: Vec<Mark>, expected: Option<String> },
  Pairs { marks: Vec<PairMark>, expected: Option<Vec<MatchPair>> },
  Words { marks: Vec<LabelMark>, expected: Option<Vec<String>> },
}

pub fn project(question: &Question, response: &Response, phase: Phase) -> Feedback {
  let submitted = phase == Phase::Submitted;
  let correct = submitted && (rules_for(question.kind()).check)(question, response);
  let reveal = submitted && !correct;

  match (&question.body, response) {
    (QuestionBody::MultipleChoiceSingle { choices, correct_answer, .. }, Response::Choice { selected }) => {
      Feedback::Choices {
        marks: choices
          .iter()
          .map(|c| {
            let picked = selected.as_deref() == Some(c.as_str());
            label_mark(c, single_mark(picked, submitted, correct, c == correct_answer))
          })
          .collect(),
      }
    }

    (QuestionBody::ImageChoice { image_choices, correct_image_label, .. }, Response::Choice { selected }) => {
      Feedback::Choices {
        marks: image_choices
          .iter()
          .map(|c| {
            let picked = selected.as_deref() == Some(c.label.as_str());
            label_mark(&c.label, single_mark(picked, submitted, correct, c.label == *correct_image_label))
          })
          .collect(),
      }
    }

    (QuestionBody::MultipleChoiceMultiple { choices, correct_answers, .. }, Response::Choices { selected }) => {
      Feedback::Choices {
        marks: choices
          .iter()
          .map(|c| {
            let picked = selected.contains(c);
            let canonical = correct_answers.contains(c);
            let mark = match (submitted, picked, canonical) {
              (false, true, _) => Mark::Selected,
              (false, false, _) => Mark::Idle,
              (true, true, true) => Mark::Correct,
              (true, true, false) => Mark::Incorrect,
              (true, false, true) => Mark::Missed,
              (true, false, false) => Mark::Idle,
            };
            label_mark(c, mark)
          })
          .collect(),
      }
    }

    (
      QuestionBody::FillInBlank { correct_answer, .. }
      | QuestionBody::Audio { correct_answer, .. }
      | QuestionBody::Translation { correct_answer, .. },
      Response::Text { .. },
    ) => Feedback::Text {
      mark: verdict(submitted, correct),
      expected: reveal.then(|| correct_answer.clone()),
      matched: if correct { matched_translation(question, response).map(str::to_string) } else { None },
    },

    (QuestionBody::Spelling { correct_spelling, .. }, Response::Letters { letters }) => Feedback::Letters {
      marks: letters
        .iter()
        .zip(correct_spelling.chars())
        .map(|(got, want)| match (submitted, got) {
          (false, _) => Mark::Idle,
          (true, None) => Mark::Missing,
          (true, Some(c)) if crate::normalize::letters_match(*c, want, question.options.case_sensitive) => Mark::Correct,
          (true, Some(_)) => Mark::Incorrect,
        })
        .collect(),
      expected: reveal.then(|| correct_spelling.clone()),
    },

    (QuestionBody::Matching { pairs: canonical }, Response::Pairs { pairs, .. }) => Feedback::Pairs {
      marks: pairs
        .iter()
        .map(|p| PairMark {
          left: p.left.clone(),
          right: p.right.clone(),
          mark: if !submitted {
            Mark::Pending
          } else if canonical.contains(p) {
            Mark::Correct
          } else {
            Mark::Incorrect
          },
        })
        .collect(),
      expected: reveal.then(|| canonical.clone()),
    },

    (QuestionBody::WordBank { correct_order, .. }, Response::WordOrder { sentence, .. }) => Feedback::Words {
      marks: sentence
        .iter()
        .enumerate()
        .map(|(i, w)| {
          let mark = if !submitted {
            Mark::Idle
          } else if correct || correct_order.get(i) == Some(w) {
            Mark::Correct
          } else {
            Mark::Incorrect
          };
          label_mark(w, mark)
        })
        .collect(),
      expected: reveal.then(|| correct_order.clone()),
    },

    // Shapes never diverge from the body inside an Interaction; keep a neutral view anyway.
    _ => Feedback::Choices { marks: Vec::new() },
  }
}

fn label_mark(label: &str, mark: Mark) -> LabelMark {
  LabelMark { label: label.to_string(), mark }
}

fn verdict(submitted: bool, correct: bool) -> Mark {
  match (submitted, correct) {
    (false, _) => Mark::Idle,
    (true, true) => Mark::Correct,
    (true, false) => Mark::Incorrect,
  }
}

/// Mark for one option of a single-selection widget. `canonical` flags the
/// correct option so it shows as missed after a wrong pick.
fn single_mark(picked: bool, submitted: bool, correct: bool, canonical: bool) -> Mark {
  match (submitted, picked) {
    (false, true) => Mark::Selected,
    (false, false) => Mark::Idle,
    (true, true) => verdict(true, correct),
    (true, false) if canonical && !correct => Mark::Missed,
    (true, false) => Mark::Idle,
  }
}

/// How a fill-in-blank sentence should be laid out around its input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum SentenceLayout {
  WithBlank { before: String, after: String },
  /// No single blank marker found; render a whole-sentence input.
  WholeSentence { sentence: String },
}

pub fn sentence_layout(sentence: &str) -> SentenceLayout {
  let mut runs: Vec<(usize, usize)> = Vec::new();
  let mut start: Option<usize> = None;
  let mut len = 0;
  for (i, ch) in sentence.char_indices() {
    if ch == '_' {
      if start.is_none() {
        start = Some(i);
        len = 0;
      }
      len += 1;
    } else if let Some(s) = start.take() {
      if len >= BLANK_MIN_RUN {
        runs.push((s, i));
      }
    }
  }
  if let Some(s) = start {
    if len >= BLANK_MIN_RUN {
      runs.push((s, sentence.len()));
    }
  }

  match runs.as_slice() {
    [(s, e)] => SentenceLayout::WithBlank {
      before: sentence[..*s].to_string(),
      after: sentence[*e..].to_string(),
    },
    _ => SentenceLayout::WholeSentence { sentence: sentence.to_string() },
  }
}

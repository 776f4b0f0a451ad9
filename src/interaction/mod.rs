//! Generic question interaction engine.
//!
//! One `Interaction` is mounted per question record. It accumulates user
//! input, checks it against the canonical answer on submit (or on the first
//! selection for single-shot kinds), and reports the outcome through an
//! `AnswerSink` exactly once per submission. Kind-specific behaviour comes
//! from the lookup table in `rules`.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{Question, QuestionBody, QuestionKind};

pub mod feedback;
pub mod response;
pub mod rules;

pub use feedback::{Feedback, SentenceLayout};
pub use response::{Recorded, Response, ResponseInput};

use response::apply_input;
use rules::rules_for;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  #[default]
  Answering,
  Submitted,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InteractionError {
  #[error("input `{input}` does not apply to {kind} questions")]
  InputMismatch { kind: QuestionKind, input: &'static str },

  #[error("`{0}` is not offered by this question")]
  UnknownOption(String),

  #[error("position {position} is out of range (length {len})")]
  OutOfRange { position: usize, len: usize },

  #[error("`{0}` is not a letter")]
  InvalidLetter(char),

  #[error("{0} questions have no audio")]
  NoAudio(QuestionKind),

  #[error("resource `{0}` does not belong to this question")]
  UnknownResource(String),
}

/// Result of a submission attempt. Only `Accepted` reaches the sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SubmitResult {
  Accepted { correct: bool },
  NotAnswerable,
  AlreadySubmitted,
}

/// Outcome handed to the hosting page once per submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerReport {
  pub question_id: String,
  pub kind: QuestionKind,
  pub correct: bool,
  pub response: Response,
}

/// Receiver of answer reports (`onAnswer`).
pub trait AnswerSink {
  fn on_answer(&mut self, report: AnswerReport);
}

impl<F: FnMut(AnswerReport)> AnswerSink for F {
  fn on_answer(&mut self, report: AnswerReport) {
    (*self)(report)
  }
}

/// Events fired by the audio player collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioEvent {
  PlayStarted,
  PlayEnded,
  PlayFailed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioStatus {
  pub play_count: u32,
  pub playing: bool,
}

#[derive(Clone, Debug)]
pub struct Interaction {
  question: Question,
  response: Response,
  phase: Phase,
  outcome: Option<bool>,
  /// Display order of matching right-hand items, shuffled once at mount.
  right_items: Vec<String>,
  audio: AudioStatus,
  failed_resources: BTreeSet<String>,
}

impl Interaction {
  pub fn mount(question: Question) -> Self {
    let right_items = match &question.body {
      QuestionBody::Matching { pairs } => {
        let mut items: Vec<String> = pairs.iter().map(|p| p.right.clone()).collect();
        items.shuffle(&mut rand::thread_rng());
        items
      }
      _ => Vec::new(),
    };
    debug!(target: "interaction", id = %question.id, kind = %question.kind(), "Mounted question");
    Self {
      response: Response::empty_for(&question.body),
      question,
      phase: Phase::Answering,
      outcome: None,
      right_items,
      audio: AudioStatus::default(),
      failed_resources: BTreeSet::new(),
    }
  }

  pub fn question(&self) -> &Question { &self.question }
  pub fn id(&self) -> &str { &self.question.id }
  pub fn kind(&self) -> QuestionKind { self.question.kind() }
  pub fn response(&self) -> &Response { &self.response }
  pub fn phase(&self) -> Phase { self.phase }
  /// Correctness, set only once submitted.
  pub fn outcome(&self) -> Option<bool> { self.outcome }
  pub fn right_items(&self) -> &[String] { &self.right_items }
  pub fn audio(&self) -> AudioStatus { self.audio }
  pub fn failed_resources(&self) -> &BTreeSet<String> { &self.failed_resources }

  /// Whether the submit affordance is enabled.
  pub fn can_submit(&self) -> bool {
    self.phase == Phase::Answering && (rules_for(self.kind()).answerable)(&self.question, &self.response)
  }

  pub fn feedback(&self) -> Feedback {
    feedback::project(&self.question, &self.response, self.phase)
  }

  /// Accumulate one input. A no-op once submitted; single-shot kinds submit
  /// through `sink` on the first applied selection.
  pub fn record(&mut self, input: ResponseInput, sink: &mut dyn AnswerSink) -> Result<Recorded, InteractionError> {
    if self.phase == Phase::Submitted {
      debug!(target: "interaction", id = %self.question.id, input = input.name(), "Input ignored after submission");
      return Ok(Recorded::Ignored);
    }
    let recorded = apply_input(&self.question.body, &mut self.response, input)?;
    if recorded == Recorded::Applied && rules_for(self.kind()).single_shot {
      self.submit(sink);
    }
    Ok(recorded)
  }

  pub fn submit(&mut self, sink: &mut dyn AnswerSink) -> SubmitResult {
    if self.phase == Phase::Submitted {
      return SubmitResult::AlreadySubmitted;
    }
    let rules = rules_for(self.kind());
    if !(rules.answerable)(&self.question, &self.response) {
      debug!(target: "interaction", id = %self.question.id, "Submit rejected: not answerable");
      return SubmitResult::NotAnswerable;
    }

    let correct = (rules.check)(&self.question, &self.response);
    self.outcome = Some(correct);
    self.phase = Phase::Submitted;
    info!(target: "interaction", id = %self.question.id, kind = %self.kind(), %correct, "Question submitted");

    sink.on_answer(AnswerReport {
      question_id: self.question.id.clone(),
      kind: self.kind(),
      correct,
      response: self.response.clone(),
    });
    SubmitResult::Accepted { correct }
  }

  /// Back to an empty response in `Answering`, from any phase.
  pub fn reset(&mut self) {
    self.response = Response::empty_for(&self.question.body);
    self.phase = Phase::Answering;
    self.outcome = None;
    self.audio.play_count = 0;
    debug!(target: "interaction", id = %self.question.id, "Question reset");
  }

  pub fn audio_event(&mut self, event: AudioEvent) -> Result<Recorded, InteractionError> {
    if self.question.body.audio_url().is_none() {
      return Err(InteractionError::NoAudio(self.kind()));
    }
    match event {
      AudioEvent::PlayStarted if self.audio.playing => Ok(Recorded::Ignored),
      AudioEvent::PlayStarted => {
        self.audio.playing = true;
        self.audio.play_count = self.audio.play_count.saturating_add(1);
        Ok(Recorded::Applied)
      }
      AudioEvent::PlayEnded | AudioEvent::PlayFailed => {
        if !self.audio.playing {
          return Ok(Recorded::Ignored);
        }
        self.audio.playing = false;
        Ok(Recorded::Applied)
      }
    }
  }

  /// Flag an image/audio URL that failed to load; views show a placeholder.
  pub fn resource_failed(&mut self, url: &str) -> Result<Recorded, InteractionError> {
    let known = match &self.question.body {
      QuestionBody::ImageChoice { image_choices, .. } => image_choices.iter().any(|c| c.image_url == url),
      body => body.audio_url() == Some(url),
    };
    if !known {
      return Err(InteractionError::UnknownResource(url.to_string()));
    }
    if self.failed_resources.insert(url.to_string()) {
      debug!(target: "interaction", id = %self.question.id, %url, "Resource failed to load");
      Ok(Recorded::Applied)
    } else {
      Ok(Recorded::Ignored)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{CheckOptions, ImageOption, MatchPair};
  use crate::interaction::feedback::Mark;

  fn question(body: QuestionBody) -> Question {
    Question { id: "q1".into(), body, options: CheckOptions::default() }
  }

  fn fill_in_blank(case_sensitive: bool) -> Question {
    Question {
      id: "q2".into(),
      body: QuestionBody::FillInBlank { sentence: "The capital of France is ____.".into(), correct_answer: "Paris".into() },
      options: CheckOptions { case_sensitive, acceptable_variations: vec![] },
    }
  }

  fn set_text(text: &str) -> ResponseInput {
    ResponseInput::SetText { text: text.into() }
  }

  /// Mount, type, submit; returns result and the reports the sink received.
  fn answer_text(q: Question, text: &str) -> (SubmitResult, Vec<AnswerReport>) {
    let mut reports = Vec::new();
    let mut sink = |r: AnswerReport| reports.push(r);
    let mut it = Interaction::mount(q);
    it.record(set_text(text), &mut sink).unwrap();
    let result = it.submit(&mut sink);
    (result, reports)
  }

  struct Collect(Vec<AnswerReport>);

  impl AnswerSink for Collect {
    fn on_answer(&mut self, report: AnswerReport) {
      self.0.push(report);
    }
  }

  fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
  }

  /// One question per kind with the inputs that answer it correctly.
  fn every_kind() -> Vec<(Question, Vec<ResponseInput>)> {
    let select = |c: &str| ResponseInput::Select { choice: c.into() };
    let toggle = |c: &str| ResponseInput::Toggle { choice: c.into() };
    let place = |w: &str| ResponseInput::PlaceWord { word: w.into(), at: None };
    vec![
      (
        question(QuestionBody::MultipleChoiceSingle {
          question: "Pick A".into(),
          choices: strings(&["A", "B"]),
          correct_answer: "A".into(),
        }),
        vec![select("A")],
      ),
      (
        question(QuestionBody::MultipleChoiceMultiple {
          question: "Pick A and C".into(),
          choices: strings(&["A", "B", "C"]),
          correct_answers: strings(&["A", "C"]),
        }),
        vec![toggle("A"), toggle("C")],
      ),
      (fill_in_blank(false), vec![set_text("Paris")]),
      (
        question(QuestionBody::Spelling { correct_spelling: "cat".into(), word: None, audio_url: None, instruction: None }),
        "cat".chars().enumerate().map(|(index, c)| ResponseInput::SetLetter { index, letter: Some(c) }).collect::<Vec<_>>(),
      ),
      (
        question(QuestionBody::Audio { audio_url: "/a.mp3".into(), correct_answer: "hello".into(), instruction: None }),
        vec![set_text("Hello")],
      ),
      (
        question(QuestionBody::Translation {
          sentence: "Hola mundo".into(),
          correct_answer: "hello world".into(),
          source_language: None,
          target_language: None,
        }),
        vec![set_text("Hello world!")],
      ),
      (
        question(QuestionBody::Matching { pairs: vec![MatchPair::new("cat", "gato")] }),
        vec![ResponseInput::SelectLeft { item: "cat".into() }, ResponseInput::SelectRight { item: "gato".into() }],
      ),
      (
        question(QuestionBody::WordBank { words: strings(&["cat", "The"]), correct_order: strings(&["The", "cat"]) }),
        vec![place("The"), place("cat")],
      ),
      (
        question(QuestionBody::ImageChoice {
          word: "apple".into(),
          image_choices: vec![ImageOption { image_url: "/img/apple.png".into(), label: "apple".into() }],
          correct_image_label: "apple".into(),
        }),
        vec![select("apple")],
      ),
    ]
  }

  #[test]
  fn lifecycle_holds_for_every_kind() {
    let cases = every_kind();
    assert_eq!(cases.len(), 9);
    for (q, inputs) in cases {
      let kind = q.kind();
      let empty = Response::empty_for(&q.body);
      let mut sink = Collect(Vec::new());
      let mut it = Interaction::mount(q);

      assert_eq!(it.submit(&mut sink), SubmitResult::NotAnswerable, "{kind}");
      assert_eq!(it.phase(), Phase::Answering, "{kind}");
      it.reset();
      assert_eq!(it.response(), &empty, "{kind}");

      for input in inputs.iter().cloned() {
        it.record(input, &mut sink).unwrap();
      }
      if it.phase() == Phase::Answering {
        // reset from a filled-in answer, then answer again
        assert!(it.can_submit(), "{kind}");
        it.reset();
        assert_eq!(it.response(), &empty, "{kind}");
        assert_eq!(it.phase(), Phase::Answering, "{kind}");
        for input in inputs.iter().cloned() {
          it.record(input, &mut sink).unwrap();
        }
        assert_eq!(it.submit(&mut sink), SubmitResult::Accepted { correct: true }, "{kind}");
      }

      assert_eq!(it.submit(&mut sink), SubmitResult::AlreadySubmitted, "{kind}");
      assert_eq!(sink.0.len(), 1, "{kind}");
      assert!(sink.0[0].correct, "{kind}");
      assert_eq!(sink.0[0].kind, kind);

      it.reset();
      assert_eq!(it.response(), &empty, "{kind}");
      assert_eq!(it.phase(), Phase::Answering, "{kind}");
      assert_eq!(it.outcome(), None, "{kind}");
      assert_eq!(sink.0.len(), 1, "{kind}");
    }
  }

  #[test]
  fn submit_is_rejected_until_answerable() {
    let mut reports = Vec::new();
    let mut sink = |r: AnswerReport| reports.push(r);
    let mut it = Interaction::mount(fill_in_blank(false));
    assert!(!it.can_submit());
    assert_eq!(it.submit(&mut sink), SubmitResult::NotAnswerable);

    it.record(set_text("   "), &mut sink).unwrap();
    assert_eq!(it.submit(&mut sink), SubmitResult::NotAnswerable);
    assert_eq!(it.phase(), Phase::Answering);
    assert_eq!(it.outcome(), None);
    drop(sink);
    assert!(reports.is_empty());
  }

  #[test]
  fn fill_in_blank_case_handling() {
    assert_eq!(answer_text(fill_in_blank(false), "Paris").0, SubmitResult::Accepted { correct: true });
    assert_eq!(answer_text(fill_in_blank(false), "paris").0, SubmitResult::Accepted { correct: true });
    assert_eq!(answer_text(fill_in_blank(true), "Paris").0, SubmitResult::Accepted { correct: true });
    assert_eq!(answer_text(fill_in_blank(true), "paris").0, SubmitResult::Accepted { correct: false });
  }

  #[test]
  fn answer_is_reported_exactly_once() {
    let mut reports = Vec::new();
    let mut sink = |r: AnswerReport| reports.push(r);
    let mut it = Interaction::mount(fill_in_blank(false));
    it.record(set_text(" Paris "), &mut sink).unwrap();
    assert_eq!(it.submit(&mut sink), SubmitResult::Accepted { correct: true });
    assert_eq!(it.submit(&mut sink), SubmitResult::AlreadySubmitted);
    assert_eq!(it.record(set_text("Lyon"), &mut sink).unwrap(), Recorded::Ignored);
    assert!(!it.can_submit());
    drop(sink);

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].question_id, "q2");
    assert!(reports[0].correct);
    assert_eq!(reports[0].response, Response::Text { text: " Paris ".into() });
  }

  #[test]
  fn reset_restores_empty_response_from_any_phase() {
    let mut sink = |_: AnswerReport| {};
    let mut it = Interaction::mount(question(QuestionBody::WordBank {
      words: vec!["sleeps".into(), "The".into(), "cat".into()],
      correct_order: vec!["The".into(), "cat".into(), "sleeps".into()],
    }));
    it.reset();
    assert_eq!(it.phase(), Phase::Answering);

    for w in ["The", "cat", "sleeps"] {
      it.record(ResponseInput::PlaceWord { word: w.into(), at: None }, &mut sink).unwrap();
    }
    assert_eq!(it.submit(&mut sink), SubmitResult::Accepted { correct: true });
    it.reset();
    assert_eq!(it.phase(), Phase::Answering);
    assert_eq!(it.outcome(), None);
    assert_eq!(
      it.response(),
      &Response::WordOrder { available: vec!["sleeps".into(), "The".into(), "cat".into()], sentence: vec![] }
    );
  }

  #[test]
  fn image_choice_submits_on_first_selection() {
    let mut reports = Vec::new();
    let mut sink = |r: AnswerReport| reports.push(r);
    let mut it = Interaction::mount(question(QuestionBody::ImageChoice {
      word: "apple".into(),
      image_choices: vec![
        ImageOption { image_url: "/img/apple.png".into(), label: "apple".into() },
        ImageOption { image_url: "/img/pear.png".into(), label: "pear".into() },
      ],
      correct_image_label: "apple".into(),
    }));
    it.record(ResponseInput::Select { choice: "pear".into() }, &mut sink).unwrap();
    assert_eq!(it.phase(), Phase::Submitted);
    assert_eq!(it.outcome(), Some(false));
    assert_eq!(it.record(ResponseInput::Select { choice: "apple".into() }, &mut sink).unwrap(), Recorded::Ignored);
    drop(sink);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].response, Response::Choice { selected: Some("pear".into()) });
  }

  #[test]
  fn matching_submission_waits_for_every_pair() {
    let mut reports = Vec::new();
    let mut sink = |r: AnswerReport| reports.push(r);
    let mut it = Interaction::mount(question(QuestionBody::Matching {
      pairs: vec![MatchPair::new("cat", "gato"), MatchPair::new("dog", "perro")],
    }));
    let mut right = it.right_items().to_vec();
    right.sort();
    assert_eq!(right, vec!["gato".to_string(), "perro".to_string()]);

    it.record(ResponseInput::SelectLeft { item: "cat".into() }, &mut sink).unwrap();
    it.record(ResponseInput::SelectRight { item: "gato".into() }, &mut sink).unwrap();
    assert_eq!(it.submit(&mut sink), SubmitResult::NotAnswerable);

    it.record(ResponseInput::SelectLeft { item: "dog".into() }, &mut sink).unwrap();
    it.record(ResponseInput::SelectRight { item: "perro".into() }, &mut sink).unwrap();
    assert!(it.can_submit());
    assert_eq!(it.submit(&mut sink), SubmitResult::Accepted { correct: true });
    drop(sink);
    assert_eq!(reports.len(), 1);
  }

  #[test]
  fn translation_normalizes_punctuation() {
    let q = question(QuestionBody::Translation {
      sentence: "Hola mundo".into(),
      correct_answer: "hello world".into(),
      source_language: None,
      target_language: None,
    });
    let (result, reports) = answer_text(q, "Hello,  world!");
    assert_eq!(result, SubmitResult::Accepted { correct: true });
    assert_eq!(reports.len(), 1);
  }

  #[test]
  fn spelling_needs_every_slot_and_marks_letters() {
    let mut sink = |_: AnswerReport| {};
    let mut it = Interaction::mount(question(QuestionBody::Spelling {
      correct_spelling: "house".into(),
      word: Some("house".into()),
      audio_url: None,
      instruction: None,
    }));
    for (i, c) in "hou".chars().enumerate() {
      it.record(ResponseInput::SetLetter { index: i, letter: Some(c) }, &mut sink).unwrap();
    }
    assert!(!it.can_submit());
    it.record(ResponseInput::SetLetter { index: 3, letter: Some('z') }, &mut sink).unwrap();
    it.record(ResponseInput::SetLetter { index: 4, letter: Some('E') }, &mut sink).unwrap();
    assert_eq!(it.submit(&mut sink), SubmitResult::Accepted { correct: false });

    let Feedback::Letters { marks, expected } = it.feedback() else { panic!("wrong shape") };
    assert_eq!(marks.iter().filter(|m| **m == Mark::Incorrect).count(), 1);
    assert_eq!(marks.iter().filter(|m| **m == Mark::Correct).count(), 4);
    assert_eq!(expected.as_deref(), Some("house"));
  }

  #[test]
  fn audio_tracking_and_reset() {
    let mut it = Interaction::mount(question(QuestionBody::Audio {
      audio_url: "/audio/hello.mp3".into(),
      correct_answer: "hello".into(),
      instruction: None,
    }));
    assert_eq!(it.audio_event(AudioEvent::PlayStarted).unwrap(), Recorded::Applied);
    assert_eq!(it.audio_event(AudioEvent::PlayStarted).unwrap(), Recorded::Ignored);
    it.audio_event(AudioEvent::PlayEnded).unwrap();
    it.audio_event(AudioEvent::PlayStarted).unwrap();
    it.audio_event(AudioEvent::PlayFailed).unwrap();
    assert_eq!(it.audio(), AudioStatus { play_count: 2, playing: false });

    it.resource_failed("/audio/hello.mp3").unwrap();
    it.reset();
    assert_eq!(it.audio().play_count, 0);
    assert!(it.failed_resources().contains("/audio/hello.mp3"));
  }

  #[test]
  fn audio_events_need_an_audio_question() {
    let mut it = Interaction::mount(fill_in_blank(false));
    assert_eq!(
      it.audio_event(AudioEvent::PlayStarted).unwrap_err(),
      InteractionError::NoAudio(QuestionKind::FillInBlank)
    );
    assert_eq!(
      it.resource_failed("/img/x.png").unwrap_err(),
      InteractionError::UnknownResource("/img/x.png".into())
    );
  }
}

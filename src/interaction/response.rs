//! User response shapes and the incremental inputs that build them.
//!
//! No validation against the canonical answer happens here; inputs are only
//! checked against what the question offers (choices, words, slots).

use serde::{Deserialize, Serialize};

use crate::domain::{MatchPair, QuestionBody};
use super::InteractionError;

/// Accumulated answer, shape depends on the question kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Response {
  /// Single choice and image choice.
  Choice { selected: Option<String> },
  /// Multiple choice; selection order is kept, membership is what counts.
  Choices { selected: Vec<String> },
  /// Fill-in-blank, audio dictation, translation.
  Text { text: String },
  /// Spelling: one slot per letter of the canonical word.
  Letters { letters: Vec<Option<char>> },
  Pairs {
    selected_left: Option<String>,
    pairs: Vec<MatchPair>,
  },
  WordOrder {
    available: Vec<String>,
    sentence: Vec<String>,
  },
}

impl Response {
  /// Initial empty shape for a question.
  pub fn empty_for(body: &QuestionBody) -> Self {
    match body {
      QuestionBody::MultipleChoiceSingle { .. } | QuestionBody::ImageChoice { .. } => {
        Response::Choice { selected: None }
      }
      QuestionBody::MultipleChoiceMultiple { .. } => Response::Choices { selected: Vec::new() },
      QuestionBody::FillInBlank { .. }
      | QuestionBody::Audio { .. }
      | QuestionBody::Translation { .. } => Response::Text { text: String::new() },
      QuestionBody::Spelling { correct_spelling, .. } => Response::Letters {
        letters: vec![None; correct_spelling.chars().count()],
      },
      QuestionBody::Matching { .. } => Response::Pairs { selected_left: None, pairs: Vec::new() },
      QuestionBody::WordBank { words, .. } => Response::WordOrder {
        available: words.clone(),
        sentence: Vec::new(),
      },
    }
  }
}

/// One discrete user input event.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ResponseInput {
  Select { choice: String },
  Toggle { choice: String },
  SetText { text: String },
  ClearText,
  SetLetter {
    index: usize,
    #[serde(default)]
    letter: Option<char>,
  },
  SelectLeft { item: String },
  SelectRight { item: String },
  RemovePair { left: String, right: String },
  PlaceWord {
    word: String,
    #[serde(default)]
    at: Option<usize>,
  },
  ReturnWord { position: usize },
  MoveWord { from: usize, to: usize },
}

impl ResponseInput {
  pub fn name(&self) -> &'static str {
    match self {
      ResponseInput::Select { .. } => "select",
      ResponseInput::Toggle { .. } => "toggle",
      ResponseInput::SetText { .. } => "set_text",
      ResponseInput::ClearText => "clear_text",
      ResponseInput::SetLetter { .. } => "set_letter",
      ResponseInput::SelectLeft { .. } => "select_left",
      ResponseInput::SelectRight { .. } => "select_right",
      ResponseInput::RemovePair { .. } => "remove_pair",
      ResponseInput::PlaceWord { .. } => "place_word",
      ResponseInput::ReturnWord { .. } => "return_word",
      ResponseInput::MoveWord { .. } => "move_word",
    }
  }
}

/// Whether an input changed the response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recorded {
  Applied,
  /// The affordance is disabled in the current state (submitted, already matched, ...).
  Ignored,
}

/// Apply one input to the response. On error the response is left untouched.
pub(crate) fn apply_input(
  body: &QuestionBody,
  response: &mut Response,
  input: ResponseInput,
) -> Result<Recorded, InteractionError> {
  let kind = body.kind();
  match (body, response, input) {
    (
      QuestionBody::MultipleChoiceSingle { choices, .. },
      Response::Choice { selected },
      ResponseInput::Select { choice },
    ) => {
      if !choices.contains(&choice) {
        return Err(InteractionError::UnknownOption(choice));
      }
      *selected = Some(choice);
      Ok(Recorded::Applied)
    }

    (
      QuestionBody::ImageChoice { image_choices, .. },
      Response::Choice { selected },
      ResponseInput::Select { choice },
    ) => {
      if !image_choices.iter().any(|c| c.label == choice) {
        return Err(InteractionError::UnknownOption(choice));
      }
      *selected = Some(choice);
      Ok(Recorded::Applied)
    }

    (
      QuestionBody::MultipleChoiceMultiple { choices, .. },
      Response::Choices { selected },
      ResponseInput::Toggle { choice },
    ) => {
      if !choices.contains(&choice) {
        return Err(InteractionError::UnknownOption(choice));
      }
      if let Some(pos) = selected.iter().position(|c| *c == choice) {
        selected.remove(pos);
      } else {
        selected.push(choice);
      }
      Ok(Recorded::Applied)
    }

    (
      QuestionBody::FillInBlank { .. } | QuestionBody::Audio { .. } | QuestionBody::Translation { .. },
      Response::Text { text },
      ResponseInput::SetText { text: new_text },
    ) => {
      *text = new_text;
      Ok(Recorded::Applied)
    }

    (
      QuestionBody::FillInBlank { .. } | QuestionBody::Audio { .. } | QuestionBody::Translation { .. },
      Response::Text { text },
      ResponseInput::ClearText,
    ) => {
      if text.is_empty() {
        return Ok(Recorded::Ignored);
      }
      text.clear();
      Ok(Recorded::Applied)
    }

    (QuestionBody::Spelling { .. }, Response::Letters { letters }, ResponseInput::SetLetter { index, letter }) => {
      if index >= letters.len() {
        return Err(InteractionError::OutOfRange { position: index, len: letters.len() });
      }
      if let Some(ch) = letter {
        if !ch.is_alphabetic() {
          return Err(InteractionError::InvalidLetter(ch));
        }
      }
      letters[index] = letter;
      Ok(Recorded::Applied)
    }

    (
      QuestionBody::Matching { pairs: canonical },
      Response::Pairs { selected_left, pairs },
      ResponseInput::SelectLeft { item },
    ) => {
      if !canonical.iter().any(|p| p.left == item) {
        return Err(InteractionError::UnknownOption(item));
      }
      if pairs.iter().any(|p| p.left == item) {
        return Ok(Recorded::Ignored);
      }
      if selected_left.as_deref() == Some(item.as_str()) {
        *selected_left = None;
      } else {
        *selected_left = Some(item);
      }
      Ok(Recorded::Applied)
    }

    (
      QuestionBody::Matching { pairs: canonical },
      Response::Pairs { selected_left, pairs },
      ResponseInput::SelectRight { item },
    ) => {
      if !canonical.iter().any(|p| p.right == item) {
        return Err(InteractionError::UnknownOption(item));
      }
      if pairs.iter().any(|p| p.right == item) {
        return Ok(Recorded::Ignored);
      }
      match selected_left.take() {
        Some(left) => {
          pairs.push(MatchPair { left, right: item });
          Ok(Recorded::Applied)
        }
        None => Ok(Recorded::Ignored),
      }
    }

    (QuestionBody::Matching { .. }, Response::Pairs { pairs, .. }, ResponseInput::RemovePair { left, right }) => {
      match pairs.iter().position(|p| p.left == left && p.right == right) {
        Some(pos) => {
          pairs.remove(pos);
          Ok(Recorded::Applied)
        }
        None => Err(InteractionError::UnknownOption(format!("{left} -> {right}"))),
      }
    }

    (QuestionBody::WordBank { .. }, Response::WordOrder { available, sentence }, ResponseInput::PlaceWord { word, at }) => {
      let Some(from) = available.iter().position(|w| *w == word) else {
        return Err(InteractionError::UnknownOption(word));
      };
      available.remove(from);
      match at {
        Some(i) if i <= sentence.len() => sentence.insert(i, word),
        _ => sentence.push(word),
      }
      Ok(Recorded::Applied)
    }

    (QuestionBody::WordBank { .. }, Response::WordOrder { available, sentence }, ResponseInput::ReturnWord { position }) => {
      if position >= sentence.len() {
        return Err(InteractionError::OutOfRange { position, len: sentence.len() });
      }
      let word = sentence.remove(position);
      available.push(word);
      Ok(Recorded::Applied)
    }

    (QuestionBody::WordBank { .. }, Response::WordOrder { sentence, .. }, ResponseInput::MoveWord { from, to }) => {
      if from >= sentence.len() {
        return Err(InteractionError::OutOfRange { position: from, len: sentence.len() });
      }
      if from == to {
        return Ok(Recorded::Ignored);
      }
      let word = sentence.remove(from);
      let to = to.min(sentence.len());
      sentence.insert(to, word);
      Ok(Recorded::Applied)
    }

    (_, _, input) => Err(InteractionError::InputMismatch { kind, input: input.name() }),
  }
}

//! Per-kind answerable predicates and comparison rules, as one lookup table.

use crate::domain::{Question, QuestionBody, QuestionKind};
use crate::normalize::{has_content, letters_match, texts_match, NormalizeMode};

use super::response::Response;

/// Behaviour a kind plugs into the generic interaction engine.
pub struct KindRules {
  /// Submission precondition.
  pub answerable: fn(&Question, &Response) -> bool,
  /// Correctness of a response, only meaningful when `answerable` holds.
  pub check: fn(&Question, &Response) -> bool,
  /// Submit on the first accepted selection instead of an explicit submit.
  pub single_shot: bool,
}

static SINGLE_CHOICE: KindRules = KindRules { answerable: has_selection, check: single_choice_correct, single_shot: true };
static MULTIPLE_CHOICE: KindRules = KindRules { answerable: has_any_choice, check: choice_set_correct, single_shot: false };
static TEXT: KindRules = KindRules { answerable: has_text, check: text_correct, single_shot: false };
static TRANSLATION: KindRules = KindRules { answerable: has_text, check: translation_correct, single_shot: false };
static SPELLING: KindRules = KindRules { answerable: all_letters_filled, check: spelling_correct, single_shot: false };
static MATCHING: KindRules = KindRules { answerable: all_pairs_formed, check: pairs_correct, single_shot: false };
static WORD_BANK: KindRules = KindRules { answerable: full_arrangement, check: order_correct, single_shot: false };
static IMAGE_CHOICE: KindRules = KindRules { answerable: has_selection, check: image_label_correct, single_shot: true };

pub fn rules_for(kind: QuestionKind) -> &'static KindRules {
  match kind {
    QuestionKind::MultipleChoiceSingle => &SINGLE_CHOICE,
    QuestionKind::MultipleChoiceMultiple => &MULTIPLE_CHOICE,
    QuestionKind::FillInBlank | QuestionKind::Audio => &TEXT,
    QuestionKind::Translation => &TRANSLATION,
    QuestionKind::Spelling => &SPELLING,
    QuestionKind::Matching => &MATCHING,
    QuestionKind::WordBank => &WORD_BANK,
    QuestionKind::ImageChoice => &IMAGE_CHOICE,
  }
}

/// Answer a translation response was accepted against: the canonical answer
/// or the first acceptable variation it matches.
pub fn matched_translation<'q>(question: &'q Question, response: &Response) -> Option<&'q str> {
  let (QuestionBody::Translation { correct_answer, .. }, Response::Text { text }) = (&question.body, response) else {
    return None;
  };
  let mode = NormalizeMode::translation(question.options.case_sensitive);
  std::iter::once(correct_answer)
    .chain(question.options.acceptable_variations.iter())
    .find(|candidate| texts_match(text, candidate, mode))
    .map(String::as_str)
}

// -------- answerable predicates --------

fn has_selection(_q: &Question, r: &Response) -> bool {
  matches!(r, Response::Choice { selected: Some(s) } if has_content(s))
}

fn has_any_choice(_q: &Question, r: &Response) -> bool {
  matches!(r, Response::Choices { selected } if selected.iter().any(|s| has_content(s)))
}

fn has_text(_q: &Question, r: &Response) -> bool {
  matches!(r, Response::Text { text } if has_content(text))
}

fn all_letters_filled(_q: &Question, r: &Response) -> bool {
  matches!(r, Response::Letters { letters } if !letters.is_empty() && letters.iter().all(Option::is_some))
}

fn all_pairs_formed(q: &Question, r: &Response) -> bool {
  match (&q.body, r) {
    (QuestionBody::Matching { pairs: canonical }, Response::Pairs { pairs, .. }) => {
      !pairs.is_empty() && pairs.len() == canonical.len()
    }
    _ => false,
  }
}

fn full_arrangement(q: &Question, r: &Response) -> bool {
  match (&q.body, r) {
    (QuestionBody::WordBank { correct_order, .. }, Response::WordOrder { sentence, .. }) => {
      !sentence.is_empty() && sentence.len() == correct_order.len()
    }
    _ => false,
  }
}

// -------- comparison rules --------

fn single_choice_correct(q: &Question, r: &Response) -> bool {
  match (&q.body, r) {
    (QuestionBody::MultipleChoiceSingle { correct_answer, .. }, Response::Choice { selected: Some(s) }) => {
      has_content(s) && s == correct_answer
    }
    _ => false,
  }
}

fn image_label_correct(q: &Question, r: &Response) -> bool {
  match (&q.body, r) {
    (QuestionBody::ImageChoice { correct_image_label, .. }, Response::Choice { selected: Some(s) }) => {
      has_content(s) && s == correct_image_label
    }
    _ => false,
  }
}

fn choice_set_correct(q: &Question, r: &Response) -> bool {
  match (&q.body, r) {
    (QuestionBody::MultipleChoiceMultiple { correct_answers, .. }, Response::Choices { selected }) => {
      !selected.is_empty()
        && selected.len() == correct_answers.len()
        && selected.iter().all(|s| correct_answers.contains(s))
    }
    _ => false,
  }
}

fn text_correct(q: &Question, r: &Response) -> bool {
  let expected = match &q.body {
    QuestionBody::FillInBlank { correct_answer, .. } | QuestionBody::Audio { correct_answer, .. } => correct_answer,
    _ => return false,
  };
  match r {
    Response::Text { text } => texts_match(text, expected, NormalizeMode::plain(q.options.case_sensitive)),
    _ => false,
  }
}

fn translation_correct(q: &Question, r: &Response) -> bool {
  matched_translation(q, r).is_some()
}

fn spelling_correct(q: &Question, r: &Response) -> bool {
  match (&q.body, r) {
    (QuestionBody::Spelling { correct_spelling, .. }, Response::Letters { letters }) => {
      let expected: Vec<char> = correct_spelling.chars().collect();
      !expected.is_empty()
        && letters.len() == expected.len()
        && letters
          .iter()
          .zip(&expected)
          .all(|(got, want)| matches!(got, Some(c) if letters_match(*c, *want, q.options.case_sensitive)))
    }
    _ => false,
  }
}

fn pairs_correct(q: &Question, r: &Response) -> bool {
  match (&q.body, r) {
    (QuestionBody::Matching { pairs: canonical }, Response::Pairs { pairs, .. }) => {
      pairs.len() == canonical.len() && pairs.iter().all(|p| canonical.contains(p))
    }
    _ => false,
  }
}

fn order_correct(q: &Question, r: &Response) -> bool {
  match (&q.body, r) {
    (QuestionBody::WordBank { correct_order, .. }, Response::WordOrder { sentence, .. }) => {
      !sentence.is_empty() && sentence == correct_order
    }
    _ => false,
  }
}

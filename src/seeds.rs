//! Built-in catalog so the app is useful without a lesson bank file.

use crate::domain::{
  Chapter, CheckOptions, Course, Grade, ImageOption, Lesson, LessonSummary, LessonType, MatchPair, Question,
  QuestionBody,
};

/// Grades and the subjects offered for each.
pub fn seed_grades() -> Vec<Grade> {
  let grade = |id: &str, label: &str, subjects: &[&str]| Grade {
    id: id.into(),
    label: label.into(),
    subjects: subjects.iter().map(|s| s.to_string()).collect(),
  };
  vec![
    grade("grade1", "Grade 1", &["Math", "English"]),
    grade("grade2", "Grade 2", &["Science", "Arabic"]),
    grade("grade3", "Grade 3", &["Math", "Science", "History"]),
    grade("grade4", "Grade 4", &["Geography", "Islamic Studies"]),
  ]
}

fn summary(id: &str, slug: &str, name: &str, lesson_type: LessonType) -> LessonSummary {
  LessonSummary { id: id.into(), slug: slug.into(), name: name.into(), lesson_type }
}

pub fn seed_courses() -> Vec<Course> {
  vec![Course {
    slug: "english-basics".into(),
    title: "English Basics".into(),
    grade: "grade1".into(),
    subject: "English".into(),
    chapters: vec![
      Chapter {
        number: 1,
        name: "Nationalities".into(),
        lessons: vec![
          summary("lsn001", "greetings", "Greetings", LessonType::Listening),
          summary("lsn002", "basic-grammar", "Basic Grammar", LessonType::Reading),
        ],
      },
      Chapter {
        number: 2,
        name: "Names".into(),
        lessons: vec![
          summary("lsn003", "fruits-basics", "Vocabulary Practice", LessonType::Quiz),
          summary("lsn004", "pronunciation", "Pronunciation", LessonType::Speaking),
        ],
      },
      Chapter {
        number: 3,
        name: "Animals".into(),
        lessons: vec![summary("lsn005", "animals-basics", "Animals", LessonType::Quiz)],
      },
    ],
  }]
}

fn q(id: &str, body: QuestionBody) -> Question {
  Question { id: id.into(), body, options: CheckOptions::default() }
}

fn strings(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| s.to_string()).collect()
}

pub fn seed_lessons() -> Vec<Lesson> {
  vec![
    Lesson {
      id: "lsn003".into(),
      slug: "fruits-basics".into(),
      name: "Vocabulary Practice".into(),
      lesson_type: LessonType::Quiz,
      questions: vec![
        q("q1", QuestionBody::MultipleChoiceMultiple {
          question: "Which of the following are fruits?".into(),
          choices: strings(&["Carrot", "Apple", "Potato", "Banana", "Tomato"]),
          correct_answers: strings(&["Apple", "Banana", "Tomato"]),
        }),
        q("q2", QuestionBody::FillInBlank {
          sentence: "The _____ is yellow and curved.".into(),
          correct_answer: "banana".into(),
        }),
        q("q3", QuestionBody::ImageChoice {
          word: "apple".into(),
          image_choices: vec![
            ImageOption { image_url: "/images/apple.png".into(), label: "apple".into() },
            ImageOption { image_url: "/images/banana.png".into(), label: "banana".into() },
            ImageOption { image_url: "/images/grapes.png".into(), label: "grapes".into() },
          ],
          correct_image_label: "apple".into(),
        }),
      ],
    },
    Lesson {
      id: "lsn005".into(),
      slug: "animals-basics".into(),
      name: "Animals".into(),
      lesson_type: LessonType::Quiz,
      questions: vec![
        q("q4", QuestionBody::MultipleChoiceMultiple {
          question: "Which of these can fly?".into(),
          choices: strings(&["Dog", "Eagle", "Penguin", "Butterfly"]),
          correct_answers: strings(&["Eagle", "Butterfly"]),
        }),
        q("q5", QuestionBody::Matching {
          pairs: vec![
            MatchPair::new("cat", "قطة"),
            MatchPair::new("dog", "كلب"),
            MatchPair::new("bird", "طائر"),
          ],
        }),
        q("q6", QuestionBody::WordBank {
          words: strings(&["sleeps", "The", "cat"]),
          correct_order: strings(&["The", "cat", "sleeps"]),
        }),
      ],
    },
    Lesson {
      id: "lsn001".into(),
      slug: "greetings".into(),
      name: "Greetings".into(),
      lesson_type: LessonType::Listening,
      questions: vec![
        q("q7", QuestionBody::MultipleChoiceSingle {
          question: "How do you greet someone in the morning?".into(),
          choices: strings(&["Good night", "Good morning", "Goodbye"]),
          correct_answer: "Good morning".into(),
        }),
        q("q8", QuestionBody::Audio {
          audio_url: "/audio/hello.mp3".into(),
          correct_answer: "Hello".into(),
          instruction: Some("Listen and type what you hear".into()),
        }),
        Question {
          id: "q9".into(),
          body: QuestionBody::Translation {
            sentence: "مرحبا، كيف حالك؟".into(),
            correct_answer: "Hello, how are you?".into(),
            source_language: Some("Arabic".into()),
            target_language: Some("English".into()),
          },
          options: CheckOptions {
            case_sensitive: false,
            acceptable_variations: strings(&["Hi, how are you?", "Hello, how are you doing?"]),
          },
        },
      ],
    },
    Lesson {
      id: "lsn002".into(),
      slug: "basic-grammar".into(),
      name: "Basic Grammar".into(),
      lesson_type: LessonType::Reading,
      questions: vec![
        q("q12", QuestionBody::FillInBlank {
          sentence: "She ____ to school every day.".into(),
          correct_answer: "goes".into(),
        }),
        q("q13", QuestionBody::WordBank {
          words: strings(&["student", "am", "I", "a"]),
          correct_order: strings(&["I", "am", "a", "student"]),
        }),
      ],
    },
    Lesson {
      id: "lsn004".into(),
      slug: "pronunciation".into(),
      name: "Pronunciation".into(),
      lesson_type: LessonType::Speaking,
      questions: vec![
        q("q10", QuestionBody::Spelling {
          correct_spelling: "house".into(),
          word: None,
          audio_url: Some("/audio/house.mp3".into()),
          instruction: Some("Listen and spell".into()),
        }),
        q("q11", QuestionBody::Spelling {
          correct_spelling: "water".into(),
          word: Some("water".into()),
          audio_url: None,
          instruction: None,
        }),
      ],
    },
  ]
}

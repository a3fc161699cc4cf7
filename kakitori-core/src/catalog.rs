//! Question catalogs.
//!
//! Two catalogs ship built in: a hiragana/kanji vocabulary set and a katakana
//! loan-word set. They are mutually exclusive because the recognizer whitelist
//! differs: with kanji allowed, `一` tends to win over the long-vowel mark `ー`.

use serde::{Deserialize, Serialize};

use crate::{DrillError, DrillResult, RecognizerConfig};

/// Every hiragana the default catalog may be answered with.
pub const HIRAGANA: &str = "あいうえおかきくけこさしすせそたちつてとなにぬねのはひふへほまみむめもやゆよらりるれろわをんがぎぐげござじずぜぞだじづでどばびぶべぼぱぴぷぺぽゃゅょっ";

/// Every katakana the katakana catalog may be answered with.
pub const KATAKANA: &str = "アイウエオカキクケコサシスセソタチツテトナニヌネノハヒフヘホマミムメモヤユヨラリルレロワヲンガギグゲゴザジズゼゾダヂヅデドバビブベボパピプペポャュョッー";

/// Kanji used by the default catalog.
pub const EXPECTED_KANJI: &str = "零一二三四五六七八九十百千万円時分何大学年生日本語私土曜半英毎今明月食行";

/// Recognizer language code for Japanese.
pub const JAPANESE: &str = "jpn";

/// Which built-in catalog to drill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    /// Hiragana and kanji vocabulary.
    #[default]
    Hiragana,
    /// Katakana loan words.
    Katakana,
}

/// One flashcard.
///
/// Deserialization goes through [`Question::new`], so accepted answers stay
/// free of duplicates whichever way a question is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "QuestionRecord")]
pub struct Question {
    prompt: String,
    answers: Vec<String>,
    hint: String,
}

/// Question as written in a JSON catalog.
#[derive(Deserialize)]
struct QuestionRecord {
    prompt: String,
    answers: Vec<String>,
    #[serde(default)]
    hint: String,
}

impl From<QuestionRecord> for Question {
    fn from(record: QuestionRecord) -> Self {
        Self::new(record.prompt, record.answers, record.hint)
    }
}

impl Question {
    /// Create a question.
    #[must_use]
    pub fn new<I, S>(prompt: impl Into<String>, answers: I, hint: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut accepted: Vec<String> = Vec::new();
        for answer in answers {
            let answer = answer.into();
            if !accepted.contains(&answer) {
                accepted.push(answer);
            }
        }
        Self {
            prompt: prompt.into(),
            answers: accepted,
            hint: hint.into(),
        }
    }

    /// English prompt shown to the learner.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Accepted answers, in catalog order.
    #[must_use]
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    /// Romanised reading shown on demand.
    #[must_use]
    pub fn hint(&self) -> &str {
        &self.hint
    }

    /// Exact, case-sensitive membership test.
    #[must_use]
    pub fn accepts(&self, candidate: &str) -> bool {
        self.answers.iter().any(|answer| answer == candidate)
    }
}

/// An ordered list of questions plus the recognizer settings that suit it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default = "default_language")]
    language: String,
    whitelist: String,
    questions: Vec<Question>,
}

fn default_language() -> String {
    JAPANESE.to_string()
}

impl Catalog {
    /// Build a catalog.
    ///
    /// # Errors
    ///
    /// Returns [`DrillError::InvalidCatalog`] if there are no questions or a
    /// question has no accepted answer.
    pub fn new(
        language: impl Into<String>,
        whitelist: impl Into<String>,
        questions: Vec<Question>,
    ) -> DrillResult<Self> {
        let catalog = Self {
            language: language.into(),
            whitelist: whitelist.into(),
            questions,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The catalog shipped for a script.
    #[must_use]
    pub fn builtin(script: Script) -> Self {
        match script {
            Script::Hiragana => Self {
                language: default_language(),
                whitelist: format!("{HIRAGANA}{EXPECTED_KANJI}"),
                questions: hiragana_questions(),
            },
            Script::Katakana => Self {
                language: default_language(),
                whitelist: KATAKANA.to_string(),
                questions: katakana_questions(),
            },
        }
    }

    /// Load a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the catalog is invalid.
    pub fn from_json(json: &str) -> DrillResult<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Serialize the catalog to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> DrillResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> DrillResult<()> {
        if self.questions.is_empty() {
            return Err(DrillError::InvalidCatalog(
                "catalog has no questions".to_string(),
            ));
        }
        if let Some(q) = self.questions.iter().find(|q| q.answers.is_empty()) {
            return Err(DrillError::InvalidCatalog(format!(
                "question '{}' has no accepted answers",
                q.prompt
            )));
        }
        Ok(())
    }

    /// Questions in catalog order.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Number of questions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the catalog is empty. Validated catalogs never are.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Question at a catalog position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Recognizer settings for this catalog.
    #[must_use]
    pub fn recognizer_config(&self) -> RecognizerConfig {
        RecognizerConfig {
            language: self.language.clone(),
            char_whitelist: self.whitelist.clone(),
        }
    }
}

fn hiragana_questions() -> Vec<Question> {
    vec![
        Question::new("Japan", ["日本", "にほん"], "nihon"),
        Question::new("college", ["大学", "だいがく"], "daigaku"),
        Question::new("I", ["私", "わたし"], "watashi"),
        Question::new("Saturday", ["土曜日", "どようび"], "doyoubi"),
        Question::new("Sunday", ["日曜日", "にちようび"], "nichiyoubi"),
        Question::new("today", ["今日", "きょう"], "kyou"),
        Question::new("tomorrow", ["明日", "あした"], "ashita"),
        Question::new("one", ["一", "いち"], "ichi"),
        Question::new("two o' clock", ["二時", "にじ"], "niji"),
        Question::new("three o'clock", ["三時", "さんじ"], "sanji"),
        Question::new("four", ["四", "よん", "し"], "yon"),
        Question::new("five", ["五", "ご"], "go"),
        Question::new("six o' clock", ["六時", "ろくじ"], "rokuji"),
        Question::new("seven", ["七", "しち", "なな"], "shichi"),
        Question::new("eight", ["八", "はち"], "hachi"),
        Question::new("nine", ["九", "きゅう", "く"], "kyu"),
        Question::new("ten", ["十", "じゅう"], "jyu"),
        Question::new("hundred", ["百", "ひゃく"], "hyaku"),
        Question::new("thousand", ["千", "せん"], "sen"),
        Question::new("ten thousand", ["万", "まん"], "man"),
        Question::new("yen", ["円", "えん"], "en"),
    ]
}

fn katakana_questions() -> Vec<Question> {
    vec![
        Question::new("ice cream", ["アイスクリーム"], "aisukuriim"),
        Question::new("jeans", ["ジーンズ"], "jiinzu"),
        Question::new("pen", ["ペン"], "It's already in romaji"),
        Question::new("notebook", ["ノート"], "nooto"),
    ]
}

//! Heuristic script-based language classification
//!
//! Classifies raw text into [`Language::Zh`], [`Language::En`], [`Language::Th`]
//! or [`Language::Unknown`] by counting Unicode script hits. The classifier is
//! pure and deterministic: it holds only immutable word lists, built once and
//! shared by reference.
//!
//! # Decision order
//!
//! 1. two or more CJK ideographs, or a CJK ratio above 0.1: `zh`
//! 2. Thai ratio above 0.2 and a common Thai word present: `th`
//! 3. Latin ratio above 0.3 and a common English word present: `en`
//! 4. any CJK ideograph: `zh`; otherwise the script with the most hits; otherwise `unknown`

use std::collections::HashSet;

use crate::models::Language;

const CJK_MIN_COUNT: usize = 2;
const CJK_RATIO: f64 = 0.1;
const THAI_RATIO: f64 = 0.2;
const LATIN_RATIO: f64 = 0.3;
const DOMINANT_RATIO: f64 = 0.5;

const COMMON_THAI_WORDS: &[&str] = &[
    "ที่", "และ", "ของ", "ใน", "เป็น", "ได้", "มี", "การ", "ไม่", "ให้", "จะ", "ว่า", "ข่าว",
    "ไทย", "กับ", "นี้", "แล้ว", "คน", "วัน", "ปี", "จาก", "เมื่อ", "โดย",
];

const COMMON_ENGLISH_WORDS: &[&str] = &[
    "the", "a", "an", "and", "of", "to", "in", "is", "for", "on", "with", "that", "it", "as",
    "at", "by", "from", "this", "are", "was", "be", "has", "have", "will", "news", "new", "says",
    "after", "over", "i", "you", "we", "my", "how", "what",
];

/// Unicode script buckets the classifier distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    /// CJK unified ideographs
    Cjk,
    /// Thai block letters and vowel signs
    Thai,
    /// Latin letters
    Latin,
}

/// Per-script character counts over letter/ideograph characters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptCounts {
    pub cjk: usize,
    pub thai: usize,
    pub latin: usize,
    /// All letter/ideograph characters, including scripts not tracked above
    pub total: usize,
}

impl ScriptCounts {
    /// Count script hits in `text`
    pub fn of(text: &str) -> Self {
        let mut counts = Self::default();
        for c in text.chars() {
            match script_of(c) {
                Some(Script::Cjk) => counts.cjk += 1,
                Some(Script::Thai) => counts.thai += 1,
                Some(Script::Latin) => counts.latin += 1,
                None if c.is_alphabetic() => {}
                None => continue,
            }
            counts.total += 1;
        }
        counts
    }

    /// Count for one script
    pub fn get(&self, script: Script) -> usize {
        match script {
            Script::Cjk => self.cjk,
            Script::Thai => self.thai,
            Script::Latin => self.latin,
        }
    }

    /// Share of letter characters in `script` (0.0 when empty)
    pub fn ratio(&self, script: Script) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.get(script) as f64 / self.total as f64
    }
}

fn script_of(c: char) -> Option<Script> {
    match c {
        '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' | '\u{F900}'..='\u{FAFF}' => {
            Some(Script::Cjk)
        }
        // Thai digits and punctuation are not letters
        '\u{0E50}'..='\u{0E59}' | '\u{0E4F}' | '\u{0E5A}' | '\u{0E5B}' => None,
        '\u{0E01}'..='\u{0E4E}' => Some(Script::Thai),
        c if c.is_ascii_alphabetic() => Some(Script::Latin),
        '\u{00C0}'..='\u{024F}' if c.is_alphabetic() => Some(Script::Latin),
        _ => None,
    }
}

/// Stateless heuristic language classifier
#[derive(Debug, Clone)]
pub struct LanguageClassifier {
    thai_words: Vec<String>,
    english_words: HashSet<String>,
}

impl Default for LanguageClassifier {
    fn default() -> Self {
        Self::new(
            COMMON_THAI_WORDS.iter().map(|w| w.to_string()).collect(),
            COMMON_ENGLISH_WORDS.iter().map(|w| w.to_string()).collect(),
        )
    }
}

impl LanguageClassifier {
    /// Create a classifier with custom common-word lists
    pub fn new(thai_words: Vec<String>, english_words: HashSet<String>) -> Self {
        Self {
            thai_words,
            english_words: english_words
                .into_iter()
                .map(|w| w.to_lowercase())
                .collect(),
        }
    }

    /// Classify `text` into a language
    pub fn detect(&self, text: &str) -> Language {
        let counts = ScriptCounts::of(text);
        if counts.total == 0 {
            return Language::Unknown;
        }

        tracing::trace!(
            cjk = counts.cjk,
            thai = counts.thai,
            latin = counts.latin,
            total = counts.total,
            "Script counts"
        );

        if counts.cjk >= CJK_MIN_COUNT || counts.ratio(Script::Cjk) > CJK_RATIO {
            return Language::Zh;
        }
        if counts.ratio(Script::Thai) > THAI_RATIO && self.has_common_thai_word(text) {
            return Language::Th;
        }
        if counts.ratio(Script::Latin) > LATIN_RATIO && self.has_common_english_word(text) {
            return Language::En;
        }

        if counts.cjk > 0 {
            return Language::Zh;
        }
        if counts.thai > 0 && counts.thai >= counts.latin {
            return Language::Th;
        }
        if counts.latin > 0 {
            return Language::En;
        }
        Language::Unknown
    }

    /// Whether `script` is present in `text`
    ///
    /// CJK is reported whenever any ideograph occurs. Thai and Latin are
    /// reported absent when CJK ideographs outnumber them in the same string.
    pub fn contains_script(&self, text: &str, script: Script) -> bool {
        let counts = ScriptCounts::of(text);
        let hits = counts.get(script);
        match script {
            Script::Cjk => hits > 0,
            Script::Thai | Script::Latin => hits > 0 && hits >= counts.cjk,
        }
    }

    /// Whether `script` accounts for more than half of the letter characters
    pub fn is_dominant(&self, text: &str, script: Script) -> bool {
        ScriptCounts::of(text).ratio(script) > DOMINANT_RATIO
    }

    fn has_common_thai_word(&self, text: &str) -> bool {
        self.thai_words.iter().any(|w| text.contains(w.as_str()))
    }

    fn has_common_english_word(&self, text: &str) -> bool {
        text.split(|c: char| !c.is_ascii_alphabetic())
            .filter(|w| !w.is_empty())
            .any(|w| self.english_words.contains(&w.to_ascii_lowercase()))
    }
}

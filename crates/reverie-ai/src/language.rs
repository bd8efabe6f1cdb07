//! Dominant-language detection for dream descriptions.
//!
//! Hosts normally plug in a platform text-analysis service through
//! [`LanguageDetector`]; [`ScriptDetector`] is a dependency-free fallback
//! that recognises non-Latin scripts and a handful of Latin-script languages
//! by their most frequent function words.

use reverie_shared::constants::{DEFAULT_LANGUAGE, DETECTION_RETRY_CHARS, MIN_DETECTABLE_CHARS};

/// Black-box language identification.
pub trait LanguageDetector: Send + Sync {
    /// Locale-style code (`"en"`, `"pt"`, ...) or `None` when undecided.
    fn detect_dominant_language(&self, text: &str) -> Option<String>;
}

/// Language to answer in for `text`.
///
/// Short texts are assumed English without consulting the detector.  When
/// the whole text is inconclusive, the first 100 characters get a second try.
pub fn resolve_language(detector: &dyn LanguageDetector, text: &str) -> String {
    let text = text.trim();
    let length = text.chars().count();

    if length < MIN_DETECTABLE_CHARS {
        return DEFAULT_LANGUAGE.to_string();
    }

    if let Some(code) = detector.detect_dominant_language(text) {
        return code;
    }

    if length > DETECTION_RETRY_CHARS {
        let prefix: String = text.chars().take(DETECTION_RETRY_CHARS).collect();
        if let Some(code) = detector.detect_dominant_language(&prefix) {
            tracing::debug!(%code, "language detected from prefix");
            return code;
        }
    }

    tracing::debug!("language detection inconclusive, assuming English");
    DEFAULT_LANGUAGE.to_string()
}

/// English name of a language code, used inside prompts.
pub fn language_name(code: &str) -> String {
    let base = code
        .split(['-', '_'])
        .next()
        .unwrap_or(code)
        .to_ascii_lowercase();

    let name = match base.as_str() {
        "en" => "English",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "nl" => "Dutch",
        "ru" => "Russian",
        "uk" => "Ukrainian",
        "el" => "Greek",
        "ar" => "Arabic",
        "he" => "Hebrew",
        "hi" => "Hindi",
        "th" => "Thai",
        "ja" => "Japanese",
        "ko" => "Korean",
        "zh" => "Chinese",
        "tr" => "Turkish",
        "pl" => "Polish",
        _ => return code.to_string(),
    };
    name.to_string()
}

/// Script and stop-word heuristic detector.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptDetector;

const STOP_WORDS: &[(&str, &[&str])] = &[
    ("en", &["the", "and", "was", "i", "my", "of", "to", "in", "it", "that", "with", "were"]),
    ("es", &["el", "la", "que", "y", "en", "los", "un", "una", "era", "mi", "con", "estaba"]),
    ("fr", &["le", "la", "et", "je", "les", "un", "une", "dans", "était", "mon", "avec", "des"]),
    ("de", &["der", "die", "und", "ich", "das", "ein", "eine", "war", "mein", "mit", "nicht", "zu"]),
    ("it", &["il", "la", "e", "che", "un", "una", "ero", "mio", "con", "di", "nel", "era"]),
    ("pt", &["o", "a", "e", "que", "um", "uma", "eu", "meu", "com", "estava", "não", "era"]),
    ("nl", &["de", "het", "en", "ik", "een", "was", "mijn", "met", "niet", "van", "dat", "op"]),
];

impl ScriptDetector {
    fn detect_script(text: &str) -> Option<&'static str> {
        let mut counts = [0usize; 10];
        let mut latin = 0usize;

        for c in text.chars() {
            let slot = match c as u32 {
                0x0400..=0x04FF => 0,                   // Cyrillic
                0x0370..=0x03FF => 1,                   // Greek
                0x0600..=0x06FF => 2,                   // Arabic
                0x0590..=0x05FF => 3,                   // Hebrew
                0x0900..=0x097F => 4,                   // Devanagari
                0x0E00..=0x0E7F => 5,                   // Thai
                0x3040..=0x30FF => 6,                   // Hiragana / Katakana
                0xAC00..=0xD7AF | 0x1100..=0x11FF => 7, // Hangul
                0x4E00..=0x9FFF => 8,                   // CJK ideographs
                _ => {
                    if c.is_alphabetic() {
                        latin += 1;
                    }
                    continue;
                }
            };
            counts[slot] += 1;
        }

        // Kana anywhere means Japanese even when kanji dominate.
        if counts[6] > 0 {
            return Some("ja");
        }

        let (slot, count) = counts
            .iter()
            .enumerate()
            .max_by_key(|(_, n)| **n)
            .map(|(i, n)| (i, *n))?;

        if count == 0 || count < latin {
            return None;
        }

        Some(match slot {
            0 => "ru",
            1 => "el",
            2 => "ar",
            3 => "he",
            4 => "hi",
            5 => "th",
            7 => "ko",
            _ => "zh",
        })
    }

    fn detect_latin(text: &str) -> Option<&'static str> {
        let words: Vec<String> = text
            .split(|c: char| !c.is_alphabetic())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();

        if words.is_empty() {
            return None;
        }

        let mut best: Option<(&'static str, usize)> = None;
        let mut tie = false;
        for &(code, stop_words) in STOP_WORDS {
            let score = words
                .iter()
                .filter(|w| stop_words.contains(&w.as_str()))
                .count();
            match best {
                Some((_, top)) if score == top => tie = true,
                Some((_, top)) if score < top => {}
                _ => {
                    best = Some((code, score));
                    tie = false;
                }
            }
        }

        match best {
            Some((code, score)) if score >= 2 && !tie => Some(code),
            _ => None,
        }
    }
}

impl LanguageDetector for ScriptDetector {
    fn detect_dominant_language(&self, text: &str) -> Option<String> {
        Self::detect_script(text)
            .or_else(|| Self::detect_latin(text))
            .map(str::to_string)
    }
}

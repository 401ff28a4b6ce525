//! The allophone set: the legal phoneme vocabulary of one locale.
//!
//! Transcriptions are strings of allophone symbols, optionally separated by
//! spaces, with stress markers in front of a syllable and `-` between
//! syllables, e.g. `' b E r - l I n`. The set is loaded from a JSON definition:
//!
//! ```json
//! {
//!   "locale": "en_US",
//!   "allophones": [
//!     { "ph": "A", "vowel": true },
//!     { "ph": "@", "vowel": true, "reduced": true },
//!     { "ph": "b" }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{G2pError, Result};
use crate::language::Language;

pub const PRIMARY_STRESS: char = '\'';
pub const SECONDARY_STRESS: char = ',';
pub const SYLLABLE_BOUNDARY: char = '-';

const IPA_PRIMARY_STRESS: char = 'ˈ';
const IPA_SECONDARY_STRESS: char = 'ˌ';

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Allophone {
    pub ph: String,
    #[serde(default)]
    pub vowel: bool,
    /// Reduced vowels (schwa and friends) never carry stress.
    #[serde(default)]
    pub reduced: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stress {
    Primary,
    Secondary,
}

/// One atomic piece of a parsed transcription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhonemeUnit {
    Phone(String),
    Stress(Stress),
    SyllableBoundary,
}

#[derive(Debug, Deserialize)]
struct AllophoneSetDef {
    locale: String,
    allophones: Vec<Allophone>,
}

#[derive(Debug, Clone)]
pub struct AllophoneSet {
    locale: String,
    language: Language,
    allophones: HashMap<String, Allophone>,
    /// Longest symbol, in chars; bounds the greedy match.
    max_len: usize,
}

impl AllophoneSet {
    pub fn new(locale: &str, allophones: Vec<Allophone>) -> Result<Self> {
        if allophones.is_empty() {
            return Err(G2pError::AllophoneSet(format!(
                "no allophones defined for locale '{}'",
                locale
            )));
        }

        let mut map = HashMap::with_capacity(allophones.len());
        let mut max_len = 0;
        for a in allophones {
            if a.ph.is_empty() || a.ph.chars().any(|c| c.is_whitespace() || is_marker(c)) {
                return Err(G2pError::AllophoneSet(format!(
                    "illegal allophone symbol '{}'",
                    a.ph
                )));
            }
            max_len = max_len.max(a.ph.chars().count());
            if let Some(dup) = map.insert(a.ph.clone(), a) {
                return Err(G2pError::AllophoneSet(format!(
                    "duplicate allophone '{}'",
                    dup.ph
                )));
            }
        }

        Ok(Self {
            locale: locale.to_string(),
            language: Language::from_locale(locale),
            allophones: map,
            max_len,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let def: AllophoneSetDef =
            serde_json::from_str(json).map_err(|e| G2pError::AllophoneSet(e.to_string()))?;
        Self::new(&def.locale, def.allophones)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| G2pError::io(path, e))?;
        let def: AllophoneSetDef =
            serde_json::from_str(&raw).map_err(|e| G2pError::json(path, e))?;
        let set = Self::new(&def.locale, def.allophones)?;
        tracing::info!(
            path = %path.display(),
            locale = %set.locale,
            allophones = set.allophones.len(),
            "loaded allophone set"
        );
        Ok(set)
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn allophone(&self, ph: &str) -> Option<&Allophone> {
        self.allophones.get(ph)
    }

    pub fn is_vowel(&self, ph: &str) -> bool {
        self.allophones.get(ph).is_some_and(|a| a.vowel)
    }

    pub fn is_reduced(&self, ph: &str) -> bool {
        self.allophones.get(ph).is_some_and(|a| a.reduced)
    }

    /// Split a transcription into allophones, stress markers and syllable
    /// boundaries, preferring the longest allophone at each position.
    pub fn parse(&self, transcription: &str) -> Result<Vec<PhonemeUnit>> {
        let chars: Vec<char> = transcription.chars().collect();
        let mut units = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            if c.is_whitespace() {
                i += 1;
                continue;
            }
            match c {
                PRIMARY_STRESS | IPA_PRIMARY_STRESS => {
                    units.push(PhonemeUnit::Stress(Stress::Primary));
                    i += 1;
                    continue;
                }
                SECONDARY_STRESS | IPA_SECONDARY_STRESS => {
                    units.push(PhonemeUnit::Stress(Stress::Secondary));
                    i += 1;
                    continue;
                }
                SYLLABLE_BOUNDARY => {
                    units.push(PhonemeUnit::SyllableBoundary);
                    i += 1;
                    continue;
                }
                _ => {}
            }

            let longest = (1..=self.max_len.min(chars.len() - i))
                .rev()
                .map(|len| chars[i..i + len].iter().collect::<String>())
                .find(|candidate| self.allophones.contains_key(candidate));

            match longest {
                Some(ph) => {
                    i += ph.chars().count();
                    units.push(PhonemeUnit::Phone(ph));
                }
                None => {
                    return Err(G2pError::InvalidTranscription {
                        transcription: transcription.to_string(),
                        remainder: chars[i..].iter().collect(),
                    });
                }
            }
        }

        Ok(units)
    }

    /// Just the allophones of a transcription, markers dropped.
    pub fn split_into_allophones(&self, transcription: &str) -> Result<Vec<String>> {
        Ok(self
            .parse(transcription)?
            .into_iter()
            .filter_map(|u| match u {
                PhonemeUnit::Phone(ph) => Some(ph),
                _ => None,
            })
            .collect())
    }
}

fn is_marker(c: char) -> bool {
    matches!(
        c,
        PRIMARY_STRESS | SECONDARY_STRESS | SYLLABLE_BOUNDARY | IPA_PRIMARY_STRESS | IPA_SECONDARY_STRESS
    )
}

/// Rewrite IPA stress marks to the canonical `'` and `,`, each followed by a
/// space as in `' b A`.
pub fn normalise_stress(transcription: &str) -> String {
    let mut out = String::with_capacity(transcription.len() + 2);
    let mut chars = transcription.chars().peekable();
    while let Some(c) = chars.next() {
        let marker = match c {
            IPA_PRIMARY_STRESS => PRIMARY_STRESS,
            IPA_SECONDARY_STRESS => SECONDARY_STRESS,
            c => {
                out.push(c);
                continue;
            }
        };
        out.push(marker);
        if chars.peek().is_some_and(|next| !next.is_whitespace()) {
            out.push(' ');
        }
    }
    out
}

/// Reduce every primary stress to secondary stress.
pub fn demote_primary_stress(transcription: &str) -> String {
    transcription
        .chars()
        .map(|c| match c {
            PRIMARY_STRESS => SECONDARY_STRESS,
            IPA_PRIMARY_STRESS => IPA_SECONDARY_STRESS,
            c => c,
        })
        .collect()
}

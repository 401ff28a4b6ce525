//! The user override dictionary and the flat text format it is read from:
//!
//! ```text
//! # comment
//! grapheme | phoneme-string | optional-space-separated-POS-list
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::allophones::AllophoneSet;
use crate::error::{G2pError, Result};

static FIELD_SEPARATOR: OnceLock<Regex> = OnceLock::new();

fn field_separator() -> &'static Regex {
    FIELD_SEPARATOR.get_or_init(|| Regex::new(r"\s*\|\s*").expect("static regex"))
}

/// One usable line of a dictionary file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictLine {
    pub grapheme: String,
    pub transcription: String,
    pub pos: Option<Vec<String>>,
}

/// Parse dictionary text line by line.
///
/// Comment, blank and malformed lines are skipped; a transcription the
/// allophone set rejects is logged and kept as written.
pub fn read_dictionary_lines(text: &str, source: &str, allophones: &AllophoneSet) -> Vec<DictLine> {
    let mut lines = Vec::new();

    for (lineno, line) in text.lines().enumerate() {
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = field_separator().split(line.trim());
        let grapheme = fields.next().unwrap_or_default();
        let transcription = fields.next().unwrap_or_default();
        if grapheme.is_empty() || transcription.is_empty() {
            tracing::warn!(
                file = source,
                line = lineno + 1,
                content = line.trim(),
                "dictionary line lacks grapheme or transcription, skipped"
            );
            continue;
        }

        if let Err(e) = allophones.parse(transcription) {
            tracing::warn!(
                file = source,
                grapheme,
                error = %e,
                "invalid dictionary entry"
            );
        }

        let pos: Vec<String> = fields
            .next()
            .map(|p| p.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        lines.push(DictLine {
            grapheme: grapheme.to_string(),
            transcription: transcription.to_string(),
            pos: if pos.is_empty() { None } else { Some(pos) },
        });
    }

    lines
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDictEntry {
    pub transcription: String,
    pub pos: Option<Vec<String>>,
}

impl UserDictEntry {
    fn matches_pos(&self, pos: &str) -> bool {
        self.pos.as_ref().is_some_and(|tags| tags.iter().any(|t| t == pos))
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserDictionary {
    entries: HashMap<String, Vec<UserDictEntry>>,
}

impl UserDictionary {
    pub fn from_text(text: &str, source: &str, allophones: &AllophoneSet) -> Self {
        let mut entries: HashMap<String, Vec<UserDictEntry>> = HashMap::new();
        for line in read_dictionary_lines(text, source, allophones) {
            entries.entry(line.grapheme).or_default().push(UserDictEntry {
                transcription: line.transcription,
                pos: line.pos,
            });
        }
        Self { entries }
    }

    pub fn from_path(path: &Path, allophones: &AllophoneSet) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| G2pError::io(path, e))?;
        let dict = Self::from_text(&text, &path.display().to_string(), allophones);
        tracing::info!(path = %path.display(), words = dict.len(), "loaded user dictionary");
        Ok(dict)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self, word: &str) -> Option<&[UserDictEntry]> {
        self.entries.get(word).map(Vec::as_slice)
    }

    /// Look `word` up as written, then lowercased, then title-cased.
    ///
    /// Among the entries of the matched word the first one listing `pos`
    /// wins; without such an entry the last one is returned.
    pub fn lookup(&self, word: &str, pos: Option<&str>) -> Option<&str> {
        if word.is_empty() {
            return None;
        }

        let entries = self.entries.get(word).or_else(|| {
            let lower = word.to_lowercase();
            self.entries
                .get(&lower)
                .or_else(|| self.entries.get(&title_case(&lower)))
        })?;

        if let Some(pos) = pos {
            if let Some(hit) = entries.iter().find(|e| e.matches_pos(pos)) {
                return Some(&hit.transcription);
            }
        }
        entries.last().map(|e| e.transcription.as_str())
    }
}

/// First letter uppercased, the rest left as is.
pub(crate) fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

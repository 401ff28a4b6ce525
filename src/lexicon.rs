use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::allophones::AllophoneSet;
use crate::error::{G2pError, Result};
use crate::userdict::{read_dictionary_lines, title_case};

/// A value in the compiled lexicon file: a bare transcription or a ranked
/// list of them, best first.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LexiconEntry {
    Simple(String),
    Ranked(Vec<String>),
}

impl LexiconEntry {
    fn into_ranked(self) -> Vec<String> {
        match self {
            LexiconEntry::Simple(ps) => vec![ps],
            LexiconEntry::Ranked(list) => list,
        }
    }
}

/// Read-only pronunciation lexicon.
///
/// Keys are either a bare word form or the word form directly followed by
/// its part-of-speech tag (`recordNN`, `recordVB`).
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: HashMap<String, Vec<String>>,
}

impl Lexicon {
    /// Load the compiled lexicon, a JSON object mapping keys to transcriptions.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| G2pError::io(path, e))?;
        let compiled: HashMap<String, LexiconEntry> =
            serde_json::from_str(&raw).map_err(|e| G2pError::json(path, e))?;
        let lexicon = Self::from_compiled(compiled);
        tracing::info!(path = %path.display(), keys = lexicon.len(), "loaded lexicon");
        Ok(lexicon)
    }

    pub fn from_compiled(compiled: HashMap<String, LexiconEntry>) -> Self {
        let entries = compiled
            .into_iter()
            .map(|(k, v)| {
                let ranked: Vec<String> = v
                    .into_ranked()
                    .into_iter()
                    .filter(|t| !t.trim().is_empty())
                    .collect();
                (k, ranked)
            })
            .filter(|(_, v)| !v.is_empty())
            .collect();
        Self { entries }
    }

    /// Build a lexicon from dictionary text (`grapheme | phonemes | POS...`).
    ///
    /// Every line is stored under the bare grapheme and under grapheme+POS
    /// for each of its tags, keeping the order of the source.
    pub fn compile(text: &str, source: &str, allophones: &AllophoneSet) -> Self {
        let mut entries: HashMap<String, Vec<String>> = HashMap::new();
        for line in read_dictionary_lines(text, source, allophones) {
            for pos in line.pos.iter().flatten() {
                push_unique(
                    entries.entry(format!("{}{}", line.grapheme, pos)).or_default(),
                    &line.transcription,
                );
            }
            push_unique(entries.entry(line.grapheme).or_default(), &line.transcription);
        }
        Self { entries }
    }

    /// Serialize to the compiled format read by [`Lexicon::from_path`].
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.entries)
            .map_err(|e| G2pError::json("<lexicon>", e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All transcriptions stored under `key`, best first.
    pub fn lookup(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// POS-specific entries first, then the bare word.
    pub fn lookup_with_pos(&self, word: &str, pos: Option<&str>) -> &[String] {
        if let Some(pos) = pos {
            let tagged = self.lookup(&format!("{}{}", word, pos));
            if !tagged.is_empty() {
                return tagged;
            }
        }
        self.lookup(word)
    }

    /// Preferred transcription of `word`, trying it as written, lowercased and
    /// title-cased.
    pub fn transcription(&self, word: &str, pos: Option<&str>) -> Option<&str> {
        if word.is_empty() {
            return None;
        }

        let mut found = self.lookup_with_pos(word, pos);
        if found.is_empty() {
            let lower = word.to_lowercase();
            found = self.lookup_with_pos(&lower, pos);
            if found.is_empty() {
                found = self.lookup_with_pos(&title_case(&lower), pos);
            }
        }
        found.first().map(String::as_str)
    }
}

fn push_unique(list: &mut Vec<String>, transcription: &str) {
    if !list.iter().any(|t| t == transcription) {
        list.push(transcription.to_string());
    }
}

//! Letter-to-sound prediction for words no dictionary knows.
//!
//! The model is a list of context rules, tried in file order at every letter
//! position. A rule rewrites `graphemes` to `phonemes` when the text before it
//! matches `left` and the text after it matches `right` (both regexes, the
//! left one anchored at its end and the right one at its start):
//!
//! ```json
//! {
//!   "locale": "en_US",
//!   "stress": "penultimate",
//!   "onsets": ["p l", "s t r"],
//!   "rules": [
//!     { "graphemes": "ph", "phonemes": "f" },
//!     { "graphemes": "e", "left": "\\w", "right": "$", "phonemes": "" }
//!   ]
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use fancy_regex::Regex;
use serde::{Deserialize, Serialize};

use crate::allophones::{AllophoneSet, PRIMARY_STRESS, SECONDARY_STRESS, SYLLABLE_BOUNDARY};
use crate::error::{G2pError, Result};

/// Which syllable carries primary stress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressRule {
    Initial,
    #[default]
    Penultimate,
    Final,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDef {
    pub graphemes: String,
    #[serde(default)]
    pub left: Option<String>,
    #[serde(default)]
    pub right: Option<String>,
    /// Space separated allophones; empty for silent letters.
    #[serde(default)]
    pub phonemes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDef {
    pub locale: String,
    #[serde(default)]
    pub stress: StressRule,
    #[serde(default)]
    pub onsets: Vec<String>,
    pub rules: Vec<RuleDef>,
}

struct Rule {
    graphemes: Vec<char>,
    left: Option<Regex>,
    right: Option<Regex>,
    phonemes: Vec<String>,
}

/// A lowercased word with the byte offset of every char, so contexts can be
/// sliced out without rebuilding strings.
struct Spelling {
    text: String,
    chars: Vec<char>,
    offsets: Vec<usize>,
}

impl Spelling {
    fn new(word: &str) -> Self {
        let text = word.to_lowercase();
        let chars: Vec<char> = text.chars().collect();
        let mut offsets: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        offsets.push(text.len());
        Self { text, chars, offsets }
    }

    fn before(&self, at: usize) -> &str {
        &self.text[..self.offsets[at]]
    }

    fn after(&self, at: usize) -> &str {
        &self.text[self.offsets[at]..]
    }
}

impl Rule {
    fn matches(&self, word: &Spelling, at: usize) -> bool {
        let end = at + self.graphemes.len();
        if end > word.chars.len() || word.chars[at..end] != self.graphemes[..] {
            return false;
        }
        self.context_ok(self.left.as_ref(), word.before(at))
            && self.context_ok(self.right.as_ref(), word.after(end))
    }

    fn context_ok(&self, re: Option<&Regex>, context: &str) -> bool {
        let Some(re) = re else {
            return true;
        };
        match re.is_match(context) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(
                    graphemes = %self.graphemes.iter().collect::<String>(),
                    context,
                    error = %e,
                    "letter-to-sound context failed to match, rule skipped"
                );
                false
            }
        }
    }
}

pub struct LetterToSound {
    allophones: Arc<AllophoneSet>,
    stress: StressRule,
    onsets: HashSet<String>,
    /// Rules bucketed by their first letter, file order kept within a bucket.
    rules: HashMap<char, Vec<Rule>>,
}

impl LetterToSound {
    pub fn new(allophones: Arc<AllophoneSet>, def: ModelDef) -> Result<Self> {
        if def.locale != allophones.locale() {
            tracing::warn!(
                model = %def.locale,
                allophones = %allophones.locale(),
                "letter-to-sound model locale differs from allophone set"
            );
        }

        let mut onsets = HashSet::with_capacity(def.onsets.len());
        for onset in &def.onsets {
            let phones = allophones.split_into_allophones(onset).map_err(|e| {
                G2pError::LetterToSound(format!("onset '{}': {}", onset, e))
            })?;
            onsets.insert(phones.join(" "));
        }

        let mut rules: HashMap<char, Vec<Rule>> = HashMap::new();
        for rd in def.rules {
            let graphemes: Vec<char> = rd.graphemes.to_lowercase().chars().collect();
            let Some(&first) = graphemes.first() else {
                return Err(G2pError::LetterToSound("rule with empty graphemes".to_string()));
            };

            let phonemes = rd
                .phonemes
                .split_whitespace()
                .map(|ph| {
                    if allophones.allophone(ph).is_some() {
                        Ok(ph.to_string())
                    } else {
                        Err(G2pError::LetterToSound(format!(
                            "rule '{}' produces unknown allophone '{}'",
                            rd.graphemes, ph
                        )))
                    }
                })
                .collect::<Result<Vec<_>>>()?;

            let left = compile_context(rd.left.as_deref(), |c| format!("(?:{})$", c))?;
            let right = compile_context(rd.right.as_deref(), |c| format!("^(?:{})", c))?;

            rules.entry(first).or_default().push(Rule { graphemes, left, right, phonemes });
        }

        Ok(Self { allophones, stress: def.stress, onsets, rules })
    }

    pub fn from_path(allophones: Arc<AllophoneSet>, path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| G2pError::io(path, e))?;
        let def: ModelDef = serde_json::from_str(&raw).map_err(|e| G2pError::json(path, e))?;
        let count = def.rules.len();
        let lts = Self::new(allophones, def)?;
        tracing::info!(path = %path.display(), rules = count, "loaded letter-to-sound model");
        Ok(lts)
    }

    /// Raw allophone sequence for `word`. Letters without a rule are skipped.
    pub fn predict(&self, word: &str) -> Vec<String> {
        let spelling = Spelling::new(word);
        let chars = &spelling.chars;
        let mut phones = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let rule = self
                .rules
                .get(&chars[i])
                .and_then(|bucket| bucket.iter().find(|r| r.matches(&spelling, i)));
            match rule {
                Some(r) => {
                    phones.extend(r.phonemes.iter().cloned());
                    i += r.graphemes.len();
                }
                None => {
                    tracing::trace!(word, letter = %chars[i], "no letter-to-sound rule");
                    i += 1;
                }
            }
        }

        phones
    }

    /// Group allophones into syllables and mark stress.
    ///
    /// Consonants between two nuclei go to the later syllable as far as they
    /// form a legal onset. Returns `None` when there is no vowel to build a
    /// syllable on or an allophone is unknown.
    pub fn syllabify(&self, phones: &[String]) -> Option<String> {
        if phones.iter().any(|p| self.allophones.allophone(p).is_none()) {
            return None;
        }
        let nuclei: Vec<usize> = (0..phones.len())
            .filter(|&i| self.allophones.is_vowel(&phones[i]))
            .collect();
        if nuclei.is_empty() {
            return None;
        }

        let mut starts = vec![0];
        for pair in nuclei.windows(2) {
            let cluster = &phones[pair[0] + 1..pair[1]];
            starts.push(pair[1] - self.onset_len(cluster));
        }

        let reduced: Vec<bool> = nuclei
            .iter()
            .map(|&n| self.allophones.is_reduced(&phones[n]))
            .collect();
        let primary = self.primary_syllable(&reduced);
        let secondary = (primary >= 2 && !reduced[0]).then_some(0);

        let mut syllables = Vec::with_capacity(starts.len());
        for (s, &start) in starts.iter().enumerate() {
            let end = starts.get(s + 1).copied().unwrap_or(phones.len());
            let body = phones[start..end].join(" ");
            let syllable = if s == primary {
                format!("{} {}", PRIMARY_STRESS, body)
            } else if secondary == Some(s) {
                format!("{} {}", SECONDARY_STRESS, body)
            } else {
                body
            };
            syllables.push(syllable);
        }

        Some(syllables.join(&format!(" {} ", SYLLABLE_BOUNDARY)))
    }

    /// `predict` followed by `syllabify`.
    pub fn transcribe(&self, word: &str) -> Option<String> {
        self.syllabify(&self.predict(word))
    }

    fn onset_len(&self, cluster: &[String]) -> usize {
        (2..=cluster.len())
            .rev()
            .find(|&k| self.onsets.contains(&cluster[cluster.len() - k..].join(" ")))
            .unwrap_or(cluster.len().min(1))
    }

    fn primary_syllable(&self, reduced: &[bool]) -> usize {
        let n = reduced.len();
        let mut candidates: Vec<usize> = (0..n).filter(|&i| !reduced[i]).collect();
        if candidates.is_empty() {
            candidates = (0..n).collect();
        }
        let first = candidates[0];
        let last = candidates[candidates.len() - 1];
        match self.stress {
            StressRule::Initial => first,
            StressRule::Final => last,
            StressRule::Penultimate if n < 2 => last,
            StressRule::Penultimate => candidates
                .iter()
                .rev()
                .copied()
                .find(|&i| i <= n - 2)
                .unwrap_or(last),
        }
    }
}

fn compile_context(
    context: Option<&str>,
    anchor: impl Fn(&str) -> String,
) -> Result<Option<Regex>> {
    match context {
        None | Some("") => Ok(None),
        Some(c) => Regex::new(&anchor(c))
            .map(Some)
            .map_err(|e| G2pError::LetterToSound(format!("bad context '{}': {}", c, e))),
    }
}

use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

use serde::{Deserialize, Serialize};

use crate::allophones::{AllophoneSet, demote_primary_stress};
use crate::config::PhonemiserConfig;
use crate::error::{G2pError, Result};
use crate::lexicon::Lexicon;
use crate::lts::LetterToSound;
use crate::normalise::normalise_unicode_letters;
use crate::userdict::UserDictionary;

/// Separator between the transcriptions of the parts of a compound.
pub const PART_SEPARATOR: &str = " - ";

/// Which tier produced a transcription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum G2pMethod {
    Userdict,
    Lexicon,
    Rules,
}

impl G2pMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            G2pMethod::Userdict => "userdict",
            G2pMethod::Lexicon => "lexicon",
            G2pMethod::Rules => "rules",
        }
    }
}

impl fmt::Display for G2pMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcription {
    pub phonemes: String,
    pub method: G2pMethod,
}

impl Transcription {
    fn new(phonemes: impl Into<String>, method: G2pMethod) -> Self {
        Self { phonemes: phonemes.into(), method }
    }
}

/// Anything that turns a written word into phonemes.
pub trait GraphemeToPhoneme: Send + Sync {
    /// `None` means no transcription could be produced; the caller should
    /// leave the word as it is.
    fn phonemise(&self, text: &str, pos: Option<&str>) -> Option<Transcription>;
}

/// Dictionary-first phonemiser with a letter-to-sound fallback.
pub struct Phonemiser {
    allophones: Arc<AllophoneSet>,
    userdict: Option<UserDictionary>,
    lexicon: Lexicon,
    lts: LetterToSound,
}

impl Phonemiser {
    pub fn new(
        allophones: Arc<AllophoneSet>,
        userdict: Option<UserDictionary>,
        lexicon: Lexicon,
        lts: LetterToSound,
    ) -> Self {
        Self { allophones, userdict, lexicon, lts }
    }

    pub fn from_config(config: &PhonemiserConfig) -> Result<Self> {
        let allophones = Arc::new(AllophoneSet::from_path(required(&config.allophones)?)?);
        let userdict = match &config.userdict {
            Some(path) => Some(UserDictionary::from_path(required(path)?, &allophones)?),
            None => None,
        };
        let lexicon = Lexicon::from_path(required(&config.lexicon)?)?;
        let lts = LetterToSound::from_path(allophones.clone(), required(&config.letter_to_sound)?)?;
        Ok(Self::new(allophones, userdict, lexicon, lts))
    }

    pub fn allophones(&self) -> &AllophoneSet {
        &self.allophones
    }

    /// Phonemise text that may consist of several parts separated by spaces
    /// or hyphens. Parts are transcribed one by one; only the first keeps its
    /// primary stress and determines the method of the whole.
    pub fn phonemise_text(&self, text: &str, pos: Option<&str>) -> Option<Transcription> {
        let mut parts = text.split([' ', '-']).filter(|p| !p.is_empty());
        let first = self.phonemise_word(parts.next()?, pos)?;

        let mut phonemes = first.phonemes;
        for part in parts {
            let Some(t) = self.phonemise_word(part, pos) else {
                tracing::debug!(text, part, "compound part could not be phonemised");
                return None;
            };
            phonemes.push_str(PART_SEPARATOR);
            phonemes.push_str(&demote_primary_stress(&t.phonemes));
        }

        Some(Transcription::new(phonemes, first.method))
    }

    /// Phonemise a single word: user dictionary, lexicon, the same two again
    /// on the Unicode-normalised spelling, and finally letter-to-sound rules.
    pub fn phonemise_word(&self, text: &str, pos: Option<&str>) -> Option<Transcription> {
        if text.is_empty() {
            return None;
        }

        if let Some(t) = self.dictionary_lookup(text, pos) {
            return Some(t);
        }

        let normalised = normalise_unicode_letters(text, self.allophones.language());
        if normalised != text {
            if let Some(t) = self.dictionary_lookup(&normalised, pos) {
                tracing::debug!(text, normalised = %normalised, "found after normalising letters");
                return Some(t);
            }
        }

        let phonemes = self.lts.transcribe(text);
        if phonemes.is_none() {
            tracing::debug!(text, "letter-to-sound rules failed to syllabify");
        }
        phonemes.map(|ps| Transcription::new(ps, G2pMethod::Rules))
    }

    fn dictionary_lookup(&self, text: &str, pos: Option<&str>) -> Option<Transcription> {
        if let Some(ps) = self.userdict.as_ref().and_then(|d| d.lookup(text, pos)) {
            return Some(Transcription::new(ps, G2pMethod::Userdict));
        }
        self.lexicon
            .transcription(text, pos)
            .map(|ps| Transcription::new(ps, G2pMethod::Lexicon))
    }
}

impl GraphemeToPhoneme for Phonemiser {
    fn phonemise(&self, text: &str, pos: Option<&str>) -> Option<Transcription> {
        self.phonemise_text(text, pos)
    }
}

fn required(path: &Path) -> Result<&Path> {
    if path.exists() {
        Ok(path)
    } else {
        Err(G2pError::MissingFile(path.to_path_buf()))
    }
}

/// A phonemiser that is built on first use.
///
/// Concurrent first calls wait for a single loader; a failed load is
/// reported to its caller and attempted again on the next call.
pub struct LazyPhonemiser {
    config: PhonemiserConfig,
    loading: Mutex<()>,
    cell: OnceLock<Arc<Phonemiser>>,
}

impl LazyPhonemiser {
    pub fn new(config: PhonemiserConfig) -> Self {
        Self { config, loading: Mutex::new(()), cell: OnceLock::new() }
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn get(&self) -> Result<Arc<Phonemiser>> {
        if let Some(p) = self.cell.get() {
            return Ok(p.clone());
        }

        // A poisoned lock only means an earlier loader panicked; the cell is
        // still empty and loading can be retried.
        let _guard = self.loading.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(p) = self.cell.get() {
            return Ok(p.clone());
        }

        let phonemiser = Arc::new(Phonemiser::from_config(&self.config)?);
        Ok(self.cell.get_or_init(|| phonemiser).clone())
    }
}

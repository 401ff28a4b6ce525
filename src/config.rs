use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{G2pError, Result};

/// Locations of the data files a [`Phonemiser`](crate::Phonemiser) is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhonemiserConfig {
    pub allophones: PathBuf,
    /// Without a user dictionary that tier is skipped.
    #[serde(default)]
    pub userdict: Option<PathBuf>,
    pub lexicon: PathBuf,
    pub letter_to_sound: PathBuf,
}

impl PhonemiserConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| G2pError::io(path, e))?;
        serde_json::from_str(&raw).map_err(|e| G2pError::json(path, e))
    }

    /// Read `<prefix>allophoneset`, `<prefix>userdict`, `<prefix>lexicon`
    /// and `<prefix>lettertosound` from a flat property map, e.g. with the
    /// prefix `en_US.`.
    pub fn from_properties(prefix: &str, props: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| {
            props
                .get(&format!("{}{}", prefix, key))
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        let need = |key: &str| get(key).ok_or_else(|| G2pError::MissingProperty(format!("{}{}", prefix, key)));

        Ok(Self {
            allophones: need("allophoneset")?,
            userdict: get("userdict"),
            lexicon: need("lexicon")?,
            letter_to_sound: need("lettertosound")?,
        })
    }
}

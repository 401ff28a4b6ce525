use serde::{Deserialize, Serialize};

use crate::phonemiser::{G2pMethod, GraphemeToPhoneme};

/// Marks the spot in a given transcription that still has to be filled in.
pub const PLACEHOLDER: char = '*';

/// A word as seen by the document walker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    /// Spelling to pronounce instead of `text`.
    pub sounds_like: Option<String>,
    pub pos: Option<String>,
    /// Transcription, possibly given in advance with a placeholder.
    pub ph: Option<String>,
    pub g2p_method: Option<G2pMethod>,
}

impl Token {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), ..Default::default() }
    }

    pub fn with_pos(mut self, pos: impl Into<String>) -> Self {
        self.pos = Some(pos.into());
        self
    }

    pub fn with_sounds_like(mut self, sounds_like: impl Into<String>) -> Self {
        self.sounds_like = Some(sounds_like.into());
        self
    }

    pub fn with_ph(mut self, ph: impl Into<String>) -> Self {
        self.ph = Some(ph.into());
        self
    }

    /// A given transcription is final unless it holds a placeholder.
    pub fn needs_transcription(&self) -> bool {
        self.ph.as_ref().is_none_or(|ph| ph.contains(PLACEHOLDER))
    }

    pub fn source_text(&self) -> &str {
        self.sounds_like.as_deref().unwrap_or(&self.text)
    }
}

/// Fill in the transcription of `token`. Returns whether it was annotated;
/// tokens that cannot be phonemised are left untouched.
pub fn annotate<G: GraphemeToPhoneme + ?Sized>(g2p: &G, token: &mut Token) -> bool {
    if !token.needs_transcription() {
        return false;
    }
    let text = token.source_text();
    if text.is_empty() {
        return false;
    }

    let Some(result) = g2p.phonemise(text, token.pos.as_deref()) else {
        tracing::debug!(text, "no transcription found");
        return false;
    };

    token.ph = Some(match token.ph.take() {
        Some(prev) => prev.replacen(PLACEHOLDER, &result.phonemes, 1),
        None => result.phonemes,
    });
    token.g2p_method = Some(result.method);
    true
}

/// Annotate every token, returning how many got a transcription.
pub fn annotate_all<G: GraphemeToPhoneme + ?Sized>(g2p: &G, tokens: &mut [Token]) -> usize {
    tokens
        .iter_mut()
        .map(|t| annotate(g2p, t))
        .filter(|&annotated| annotated)
        .count()
}

//! Dictionary-first grapheme-to-phoneme conversion.
//!
//! A [`Phonemiser`] looks words up in an optional user dictionary, then in the
//! main [`Lexicon`], retries both with diacritics normalised away, and falls
//! back to [`LetterToSound`] rules with syllabification. Every result carries
//! the [`G2pMethod`] that produced it.

pub mod allophones;
pub mod config;
pub mod error;
pub mod language;
pub mod lexicon;
pub mod lts;
pub mod normalise;
pub mod phonemiser;
pub mod token;
pub mod userdict;

pub use allophones::AllophoneSet;
pub use config::PhonemiserConfig;
pub use error::{G2pError, Result};
pub use language::Language;
pub use lexicon::Lexicon;
pub use lts::LetterToSound;
pub use phonemiser::{G2pMethod, GraphemeToPhoneme, LazyPhonemiser, Phonemiser, Transcription};
pub use token::Token;
pub use userdict::UserDictionary;

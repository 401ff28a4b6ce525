use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Language {
    English,
    German,
    French,
    Swedish,
    Finnish,
    Turkish,
    Other,
}

impl Language {
    /// `en_US`, `en-GB`, `de` ... are all accepted.
    pub fn from_locale(locale: &str) -> Self {
        let code = locale
            .split(['_', '-'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match code.as_str() {
            "en" => Language::English,
            "de" => Language::German,
            "fr" => Language::French,
            "sv" => Language::Swedish,
            "fi" => Language::Finnish,
            "tr" => Language::Turkish,
            _ => Language::Other,
        }
    }

    /// Letters with diacritics that belong to this language's own alphabet
    /// and so must survive Unicode letter normalisation.
    pub fn native_letters(&self) -> &'static str {
        match self {
            Language::German => "äöüÄÖÜß",
            Language::French => "àâæçéèêëîïôœùûüÿÀÂÆÇÉÈÊËÎÏÔŒÙÛÜŸ",
            Language::Swedish | Language::Finnish => "åäöÅÄÖ",
            Language::Turkish => "çğıöşüÇĞİÖŞÜ",
            Language::English | Language::Other => "",
        }
    }
}

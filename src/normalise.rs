use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::{decompose_canonical, is_combining_mark};

use crate::language::Language;

/// Replace "exotic" letters by the plain letters a lexicon is most likely to
/// contain: diacritics are dropped and ligatures expanded. Letters that are
/// part of the locale's own alphabet are left alone, and so is case.
///
/// Input may be composed or decomposed; native letters are recognised in
/// their composed form.
pub fn normalise_unicode_letters(text: &str, language: Language) -> String {
    let native = language.native_letters();
    let mut out = String::with_capacity(text.len());
    for c in text.nfc() {
        if native.contains(c) {
            out.push(c);
            continue;
        }
        match c {
            'æ' => out.push_str("ae"),
            'Æ' => out.push_str("Ae"),
            'œ' => out.push_str("oe"),
            'Œ' => out.push_str("Oe"),
            'ß' => out.push_str("ss"),
            // no canonical decomposition
            'ø' => out.push('o'),
            'Ø' => out.push('O'),
            'ł' => out.push('l'),
            'Ł' => out.push('L'),
            'đ' => out.push('d'),
            'Đ' => out.push('D'),
            'ı' => out.push('i'),
            _ => decompose_canonical(c, |d| {
                if !is_combining_mark(d) {
                    out.push(d);
                }
            }),
        }
    }
    out.nfc().collect()
}

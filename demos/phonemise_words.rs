use std::path::Path;

use phonemiser::{GraphemeToPhoneme, Phonemiser, PhonemiserConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join("en_US");
    let config = PhonemiserConfig {
        allophones: data.join("allophones.json"),
        userdict: Some(data.join("userdict.txt")),
        lexicon: data.join("lexicon.json"),
        letter_to_sound: data.join("lts.json"),
    };
    let g2p = Phonemiser::from_config(&config)?;

    let words: Vec<String> = std::env::args().skip(1).collect();
    let words = if words.is_empty() {
        ["tomato", "lead", "BERLIN", "café", "new-york", "station", "psst"]
            .iter()
            .map(|w| w.to_string())
            .collect()
    } else {
        words
    };

    println!("=== Phonemising ({}) ===", g2p.allophones().locale());
    for word in &words {
        match g2p.phonemise(word, None) {
            Some(t) => println!("{:<12} {:<10} {}", word, t.method, t.phonemes),
            None => println!("{:<12} (not found)", word),
        }
    }
    Ok(())
}

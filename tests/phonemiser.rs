use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use phonemiser::token::{annotate_all, Token};
use phonemiser::{
    G2pError, G2pMethod, GraphemeToPhoneme, LazyPhonemiser, Phonemiser, PhonemiserConfig,
    Transcription,
};
use tempfile::TempDir;

fn bundled() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join("en_US")
}

fn bundled_config() -> PhonemiserConfig {
    let dir = bundled();
    PhonemiserConfig {
        allophones: dir.join("allophones.json"),
        userdict: Some(dir.join("userdict.txt")),
        lexicon: dir.join("lexicon.json"),
        letter_to_sound: dir.join("lts.json"),
    }
}

fn bundled_phonemiser() -> Phonemiser {
    Phonemiser::from_config(&bundled_config()).unwrap()
}

/// Bundled data, with the user dictionary swapped for `userdict`.
fn config_with_userdict(userdict: &str) -> (TempDir, PhonemiserConfig) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = bundled_config();
    let path = dir.path().join("userdict.txt");
    std::fs::write(&path, userdict).unwrap();
    config.userdict = Some(path);
    (dir, config)
}

#[test]
fn test_userdict_override() {
    let p = bundled_phonemiser();
    assert_eq!(
        p.phonemise("tomato", None),
        Some(Transcription { phonemes: "t @ - ' m A - t oU".into(), method: G2pMethod::Userdict })
    );
}

#[test]
fn test_userdict_pos_disambiguation() {
    let p = bundled_phonemiser();
    assert_eq!(p.phonemise("lead", Some("VB")).unwrap().phonemes, "' l i d");
    assert_eq!(p.phonemise("lead", Some("VBP")).unwrap().phonemes, "' l i d");
    assert_eq!(p.phonemise("lead", Some("NN")).unwrap().phonemes, "' l E d");
    assert_eq!(p.phonemise("lead", Some("JJ")).unwrap().phonemes, "' l E d");
}

#[test]
fn test_userdict_wins_over_lexicon_and_rules() {
    let (_dir, config) = config_with_userdict("cat | ' k V t\nblog | ' b l O g\n");
    let p = Phonemiser::from_config(&config).unwrap();
    for (word, expected) in [("cat", "' k V t"), ("blog", "' b l O g")] {
        let t = p.phonemise(word, None).unwrap();
        assert_eq!(t.method, G2pMethod::Userdict);
        assert_eq!(t.phonemes, expected);
    }
}

#[test]
fn test_lexicon_case_folding_and_pos() {
    let p = bundled_phonemiser();
    for word in ["Berlin", "berlin", "BERLIN"] {
        let t = p.phonemise(word, None).unwrap();
        assert_eq!(t.method, G2pMethod::Lexicon);
        assert_eq!(t.phonemes, "b r= - ' l I n");
    }
    assert_eq!(p.phonemise("read", Some("VBD")).unwrap().phonemes, "' r E d");
    assert_eq!(p.phonemise("read", Some("VB")).unwrap().phonemes, "' r i d");
}

#[test]
fn test_normalised_retry() {
    let p = bundled_phonemiser();
    let t = p.phonemise("café", None).unwrap();
    assert_eq!(t.method, G2pMethod::Lexicon);
    assert_eq!(t.phonemes, "k { - ' f EI");
}

#[test]
fn test_rules_fallback() {
    let p = bundled_phonemiser();
    let t = p.phonemise("blog", None).unwrap();
    assert_eq!(t.method, G2pMethod::Rules);
    assert_eq!(t.phonemes, "' b l A g");
    assert_eq!(p.phonemise("psst", None), None);
}

#[test]
fn test_compound_stress_demotion() {
    let p = bundled_phonemiser();
    let t = p.phonemise("new-york", None).unwrap();
    assert_eq!(t.phonemes, "' n u - , j O r k");
    assert_eq!(t.method, G2pMethod::Lexicon);
}

#[test]
fn test_rules_output_parses_with_allophone_set() {
    let p = bundled_phonemiser();
    for word in ["blog", "phantom", "quickly", "station", "strange", "yellow"] {
        let t = p.phonemise(word, None).unwrap_or_else(|| panic!("no transcription for {}", word));
        assert_eq!(t.method, G2pMethod::Rules, "{}", word);
        assert!(p.allophones().parse(&t.phonemes).is_ok(), "{} -> {}", word, t.phonemes);
        assert_eq!(t.phonemes.matches('\'').count(), 1, "{} -> {}", word, t.phonemes);
    }
}

#[test]
fn test_malformed_lines_do_not_abort_loading() {
    let mut text = String::from("# nine good entries and one broken line\nno separator on this line\n");
    for i in 0..9 {
        text.push_str(&format!("word{} | ' w r= d\n", i));
    }
    let (_dir, config) = config_with_userdict(&text);
    let p = Phonemiser::from_config(&config).unwrap();
    for i in 0..9 {
        assert_eq!(
            p.phonemise(&format!("word{}", i), None).unwrap().method,
            G2pMethod::Userdict
        );
    }
}

#[test]
fn test_invalid_phonemes_are_kept() {
    let (_dir, config) = config_with_userdict("zork | ' z Q r k\n");
    let p = Phonemiser::from_config(&config).unwrap();
    assert_eq!(p.phonemise("zork", None).unwrap().phonemes, "' z Q r k");
}

/// Log output collected in memory.
#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_bad_dictionary_lines_are_logged_with_file_and_grapheme() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("overrides.txt");
    std::fs::write(&path, "no separator here\nzork | ' z Q r k\ncat | ' k V t\n").unwrap();
    let mut config = bundled_config();
    config.userdict = Some(path);

    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let p = tracing::subscriber::with_default(subscriber, || Phonemiser::from_config(&config)).unwrap();
    assert_eq!(p.phonemise("cat", None).unwrap().method, G2pMethod::Userdict);

    let warnings: Vec<String> = log
        .contents()
        .lines()
        .filter(|l| l.contains("WARN"))
        .map(str::to_string)
        .collect();
    assert_eq!(warnings.len(), 2, "{:?}", warnings);
    assert!(warnings.iter().all(|w| w.contains("overrides.txt")), "{:?}", warnings);
    assert!(warnings[0].contains("no separator here"), "{}", warnings[0]);
    assert!(warnings[0].contains("line=1"), "{}", warnings[0]);
    assert!(warnings[1].contains("zork"), "{}", warnings[1]);
}

#[test]
fn test_two_instances_agree() {
    let a = bundled_phonemiser();
    let b = bundled_phonemiser();
    for word in ["tomato", "lead", "Berlin", "record", "café", "blog", "new york", "psst"] {
        for pos in [None, Some("NN"), Some("VB")] {
            assert_eq!(a.phonemise(word, pos), b.phonemise(word, pos), "{} {:?}", word, pos);
        }
    }
}

#[test]
fn test_without_userdict() {
    let mut config = bundled_config();
    config.userdict = None;
    let p = Phonemiser::from_config(&config).unwrap();
    // falls through to the rules
    assert_eq!(p.phonemise("tomato", None).unwrap().method, G2pMethod::Rules);
}

#[test]
fn test_missing_files_are_fatal() {
    let mut config = bundled_config();
    config.lexicon = bundled().join("no-such-lexicon.json");
    match Phonemiser::from_config(&config) {
        Err(G2pError::MissingFile(path)) => assert!(path.ends_with("no-such-lexicon.json")),
        Err(e) => panic!("unexpected error {}", e),
        Ok(_) => panic!("expected an error"),
    }

    let mut config = bundled_config();
    config.userdict = Some(bundled().join("missing.txt"));
    assert!(matches!(Phonemiser::from_config(&config), Err(G2pError::MissingFile(_))));
}

#[test]
fn test_corrupt_lexicon_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lexicon.json");
    std::fs::write(&path, "{ not json").unwrap();
    let mut config = bundled_config();
    config.lexicon = path;
    assert!(matches!(Phonemiser::from_config(&config), Err(G2pError::Json { .. })));
}

#[test]
fn test_config_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("phonemiser.json");
    std::fs::write(&path, serde_json::to_string(&bundled_config()).unwrap()).unwrap();
    let config = PhonemiserConfig::from_json_file(&path).unwrap();
    assert_eq!(config, bundled_config());

    let mut props = HashMap::new();
    props.insert("en_US.allophoneset".to_string(), config.allophones.display().to_string());
    props.insert("en_US.lexicon".to_string(), config.lexicon.display().to_string());
    props.insert("en_US.lettertosound".to_string(), config.letter_to_sound.display().to_string());
    let from_props = PhonemiserConfig::from_properties("en_US.", &props).unwrap();
    assert!(Phonemiser::from_config(&from_props).is_ok());
}

#[test]
fn test_concurrent_queries() {
    let p = Arc::new(bundled_phonemiser());
    let expected = p.phonemise("new-york", None);
    std::thread::scope(|s| {
        for _ in 0..8 {
            let p = p.clone();
            let expected = expected.clone();
            s.spawn(move || {
                for _ in 0..100 {
                    assert_eq!(p.phonemise("new-york", None), expected);
                    assert_eq!(p.phonemise("blog", None).unwrap().method, G2pMethod::Rules);
                }
            });
        }
    });
}

#[test]
fn test_lazy_loads_once() {
    let lazy = LazyPhonemiser::new(bundled_config());
    assert!(!lazy.is_loaded());
    let loaded: Vec<Arc<Phonemiser>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4).map(|_| s.spawn(|| lazy.get().unwrap())).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(lazy.is_loaded());
    assert!(loaded.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}

#[test]
fn test_lazy_reports_load_failure() {
    let mut config = bundled_config();
    config.allophones = bundled().join("missing.json");
    let lazy = LazyPhonemiser::new(config);
    assert!(lazy.get().is_err());
    assert!(!lazy.is_loaded());
}

#[test]
fn test_annotate_tokens() {
    let p = bundled_phonemiser();
    let mut tokens = vec![
        Token::new("lead").with_pos("NN"),
        Token::new("NY").with_sounds_like("new york"),
        Token::new("synthesis").with_ph("' s I n - T @ - s I s"),
        Token::new("speech").with_ph(", t E k s t - *"),
        Token::new("psst"),
    ];
    let g2p: &dyn GraphemeToPhoneme = &p;
    assert_eq!(annotate_all(g2p, &mut tokens), 3);
    assert_eq!(tokens[0].ph.as_deref(), Some("' l E d"));
    assert_eq!(tokens[1].ph.as_deref(), Some("' n u - , j O r k"));
    assert_eq!(tokens[2].g2p_method, None);
    assert_eq!(tokens[3].ph.as_deref(), Some(", t E k s t - ' s p i tS"));
    assert_eq!(tokens[3].g2p_method, Some(G2pMethod::Lexicon));
    assert!(tokens[4].ph.is_none());
}

use include_dir::{include_dir, Dir};
use serde::Deserialize;

static LANG_DIR: Dir = include_dir!("src/lang");

/// A word corpus embedded in the binary.
#[derive(Deserialize, Clone, Debug)]
pub struct Language {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

impl Language {
    /// Load an embedded corpus by file stem, e.g. `"english"`.
    ///
    /// Panics when the corpus is missing or malformed; the word lists ship
    /// inside the binary, so this can only fail on a broken build.
    pub fn new(file_name: &str) -> Self {
        let file = LANG_DIR
            .get_file(format!("{file_name}.json"))
            .expect("language file not found");

        let contents = file
            .contents_utf8()
            .expect("language file is not valid utf-8");

        serde_json::from_str(contents).expect("unable to deserialize language json")
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::new("english")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_corpus_loads() {
        let lang = Language::new("english");

        assert_eq!(lang.name, "english");
        assert!(!lang.words.is_empty());
        assert_eq!(lang.size as usize, lang.words.len());
    }

    #[test]
    fn corpus_has_no_empty_or_uppercase_words() {
        let lang = Language::default();

        for word in &lang.words {
            assert!(!word.is_empty());
            assert_eq!(word, &word.to_lowercase());
            assert!(!word.contains(' '));
        }
    }

    #[test]
    #[should_panic(expected = "language file not found")]
    fn missing_corpus_panics() {
        let _ = Language::new("nonexistent");
    }
}

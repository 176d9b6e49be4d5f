use crate::language::Language;
use rand::seq::SliceRandom;

/// Produces batches of lowercase words for the session's word list.
///
/// Contract: `generate(n)` returns exactly `n` non-empty words; successive
/// calls may return different words.
pub trait WordSource {
    fn generate(&mut self, count: usize) -> Vec<String>;
}

/// Production source sampling a [`Language`] corpus uniformly at random.
pub struct RandomWords {
    language: Language,
}

impl RandomWords {
    pub fn new(language: Language) -> Self {
        Self { language }
    }
}

impl Default for RandomWords {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

impl WordSource for RandomWords {
    fn generate(&mut self, count: usize) -> Vec<String> {
        let mut rng = rand::thread_rng();
        (0..count)
            .map(|_| {
                self.language
                    .words
                    .choose(&mut rng)
                    .cloned()
                    .unwrap_or_else(|| "the".to_string())
            })
            .collect()
    }
}

/// Deterministic source cycling over a fixed script. Test-only collaborator,
/// also handy for demo recordings.
pub struct ScriptedSource {
    script: Vec<String>,
    next: usize,
}

impl ScriptedSource {
    pub fn cycling(words: &[&str]) -> Self {
        assert!(!words.is_empty(), "scripted source needs at least one word");
        Self {
            script: words.iter().map(|w| w.to_string()).collect(),
            next: 0,
        }
    }
}

impl WordSource for ScriptedSource {
    fn generate(&mut self, count: usize) -> Vec<String> {
        (0..count)
            .map(|_| {
                let word = self.script[self.next % self.script.len()].clone();
                self.next += 1;
                word
            })
            .collect()
    }
}

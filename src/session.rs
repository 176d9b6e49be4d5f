use crate::metrics::{self, LiveStats};
use crate::time_series::WpmSeries;
use crate::word_source::WordSource;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

/// Words generated up front when a session is (re)created.
pub const INITIAL_BATCH: usize = 20;
/// Words appended per top-up once the cursor gets close to the end.
pub const REFILL_BATCH: usize = 50;
/// Top up while this many or fewer words remain at or beyond the cursor.
pub const LOOKAHEAD: usize = 10;

/// Selectable test durations in seconds (time mode).
pub const DURATIONS: [u64; 4] = [15, 30, 60, 120];
/// Selectable test lengths in words (words mode).
pub const WORD_COUNTS: [usize; 4] = [10, 25, 50, 100];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    Time,
    Words,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TestOptions {
    pub mode: Mode,
    pub duration_secs: u64,
    pub word_count: usize,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Time,
            duration_secs: 30,
            word_count: 25,
        }
    }
}

/// Partial update for [`TestOptions`]; unset fields keep their current value.
#[derive(Clone, Copy, Debug, Default)]
pub struct OptionsPatch {
    pub mode: Option<Mode>,
    pub duration_secs: Option<u64>,
    pub word_count: Option<usize>,
}

/// The authoritative state of one typing test.
///
/// All mutation happens through [`apply_input`](Session::apply_input),
/// [`on_tick`](Session::on_tick), [`restart`](Session::restart) and
/// [`set_options`](Session::set_options); the UI only reads.
pub struct Session {
    pub words: Vec<String>,
    pub current_word: usize,
    pub current_char: usize,
    pub input: String,
    /// Indices of words completed with a mismatch. Append-only.
    pub errors: HashSet<usize>,
    // Counters track total keystroke effort: they never decrease, even when
    // a character is later backspaced away.
    pub correct_chars: usize,
    pub incorrect_chars: usize,
    pub correct_words: usize,
    pub incorrect_words: usize,
    pub started_at: Option<Instant>,
    pub seconds_elapsed: u64,
    pub finished: bool,
    pub options: TestOptions,
    pub wpm_series: WpmSeries,
    source: Box<dyn WordSource>,
}

impl Session {
    pub fn new(options: TestOptions, mut source: Box<dyn WordSource>) -> Self {
        let words = source.generate(INITIAL_BATCH);
        Self {
            words,
            current_word: 0,
            current_char: 0,
            input: String::new(),
            errors: HashSet::new(),
            correct_chars: 0,
            incorrect_chars: 0,
            correct_words: 0,
            incorrect_words: 0,
            started_at: None,
            seconds_elapsed: 0,
            finished: false,
            options,
            wpm_series: WpmSeries::default(),
            source,
        }
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn has_finished(&self) -> bool {
        self.finished
    }

    /// The word under the cursor.
    pub fn target_word(&self) -> &str {
        &self.words[self.current_word]
    }

    /// Feed the full proposed input-buffer value, as produced by the input
    /// adapter or a text field.
    ///
    /// A value ending in a space is a word boundary: the trimmed buffer is
    /// scored against the target word and the cursor moves on. Any other
    /// value rescores only the positions at or beyond the previous char
    /// index, so backspacing never touches the counters.
    pub fn apply_input(&mut self, value: &str) {
        if self.finished {
            return;
        }

        if !self.has_started() && !value.is_empty() {
            self.started_at = Some(Instant::now());
        }

        if value.ends_with(' ') {
            let typed = value.trim();
            if typed == self.target_word() {
                self.correct_words += 1;
            } else {
                self.incorrect_words += 1;
                self.errors.insert(self.current_word);
            }

            self.input.clear();
            self.current_char = 0;

            if self.options.mode == Mode::Words
                && self.current_word + 1 >= self.options.word_count
            {
                self.finished = true;
            } else {
                self.current_word += 1;
                self.refill_words();
            }
        } else {
            let target: Vec<char> = self.target_word().chars().collect();
            for (i, c) in value.chars().enumerate() {
                // Positions already scored on a previous value are skipped;
                // positions past the target word are ignored entirely.
                if i < self.current_char || i >= target.len() {
                    continue;
                }
                if c == target[i] {
                    self.correct_chars += 1;
                } else {
                    self.incorrect_chars += 1;
                }
            }

            self.current_char = value.chars().count();
            self.input = value.to_string();
        }
    }

    /// Append a fresh batch once fewer than [`LOOKAHEAD`] words remain
    /// beyond the cursor. The word index therefore never runs off the end
    /// of the list.
    pub fn refill_words(&mut self) {
        if self.finished {
            return;
        }
        while self.words.len() - self.current_word <= LOOKAHEAD {
            let batch = self.source.generate(REFILL_BATCH);
            self.words.extend(batch);
        }
    }

    /// Recompute elapsed time from the wall clock. Ticks arriving before the
    /// first keystroke or after the session finished are no-ops, so a stale
    /// tick can never mutate a superseded session.
    pub fn on_tick(&mut self) {
        if self.finished {
            return;
        }
        let Some(started_at) = self.started_at else {
            return;
        };

        self.seconds_elapsed = started_at.elapsed().as_secs();

        if self.options.mode == Mode::Time && self.seconds_elapsed >= self.options.duration_secs {
            self.finished = true;
        }

        if self.seconds_elapsed > 0 {
            self.wpm_series.record(
                self.seconds_elapsed,
                metrics::wpm(self.correct_chars, self.seconds_elapsed),
            );
        }
    }

    /// Reset every field and regenerate the word list. Valid from any state;
    /// calling it twice is the same as calling it once.
    pub fn restart(&mut self) {
        self.words = self.source.generate(INITIAL_BATCH);
        self.current_word = 0;
        self.current_char = 0;
        self.input.clear();
        self.errors.clear();
        self.correct_chars = 0;
        self.incorrect_chars = 0;
        self.correct_words = 0;
        self.incorrect_words = 0;
        self.started_at = None;
        self.seconds_elapsed = 0;
        self.finished = false;
        self.wpm_series.clear();
    }

    /// Merge an options patch, then restart. Any configuration change resets
    /// the whole session.
    pub fn set_options(&mut self, patch: OptionsPatch) {
        if let Some(mode) = patch.mode {
            self.options.mode = mode;
        }
        if let Some(secs) = patch.duration_secs {
            self.options.duration_secs = secs;
        }
        if let Some(count) = patch.word_count {
            self.options.word_count = count;
        }
        self.restart();
    }

    /// Live statistics snapshot for the current counters and elapsed time.
    pub fn stats(&self) -> LiveStats {
        let total_chars = self.correct_chars + self.incorrect_chars;
        LiveStats {
            wpm: metrics::wpm(self.correct_chars, self.seconds_elapsed),
            accuracy: metrics::accuracy(self.correct_chars, self.incorrect_chars),
            raw_wpm: metrics::raw_wpm(total_chars, self.seconds_elapsed),
            net_wpm: metrics::net_wpm(total_chars, self.incorrect_words, self.seconds_elapsed),
            correct_chars: self.correct_chars,
            incorrect_chars: self.incorrect_chars,
            correct_words: self.correct_words,
            incorrect_words: self.incorrect_words,
            seconds_elapsed: self.seconds_elapsed,
        }
    }

    /// Seconds left in time mode, `None` in words mode.
    pub fn seconds_remaining(&self) -> Option<u64> {
        match self.options.mode {
            Mode::Time => Some(self.options.duration_secs.saturating_sub(self.seconds_elapsed)),
            Mode::Words => None,
        }
    }

    /// Completed words so far, for the words-mode progress display.
    pub fn words_completed(&self) -> usize {
        self.correct_words + self.incorrect_words
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word_source::ScriptedSource;
    use std::time::Duration;

    fn session_with(words: &[&str], options: TestOptions) -> Session {
        Session::new(options, Box::new(ScriptedSource::cycling(words)))
    }

    fn words_session(words: &[&str], word_count: usize) -> Session {
        session_with(
            words,
            TestOptions {
                mode: Mode::Words,
                word_count,
                ..TestOptions::default()
            },
        )
    }

    #[test]
    fn new_session_is_not_started() {
        let session = session_with(&["the"], TestOptions::default());

        assert!(!session.has_started());
        assert!(!session.has_finished());
        assert_eq!(session.current_word, 0);
        assert_eq!(session.current_char, 0);
        assert_eq!(session.words.len(), INITIAL_BATCH);
    }

    #[test]
    fn first_input_starts_the_session() {
        let mut session = session_with(&["the"], TestOptions::default());

        session.apply_input("t");

        assert!(session.has_started());
        assert!(session.started_at.is_some());
    }

    #[test]
    fn empty_input_does_not_start_the_session() {
        let mut session = session_with(&["the"], TestOptions::default());

        session.apply_input("");

        assert!(!session.has_started());
    }

    #[test]
    fn correct_progression_scores_each_new_char_once() {
        // target "the": "t" -> "th" -> "the" -> "the "
        let mut session = session_with(&["the"], TestOptions::default());

        session.apply_input("t");
        assert_eq!(session.correct_chars, 1);

        session.apply_input("th");
        assert_eq!(session.correct_chars, 2);

        session.apply_input("the");
        assert_eq!(session.correct_chars, 3);
        assert_eq!(session.incorrect_chars, 0);

        session.apply_input("the ");
        assert_eq!(session.correct_words, 1);
        assert_eq!(session.incorrect_words, 0);
        assert_eq!(session.input, "");
        assert_eq!(session.current_char, 0);
        assert_eq!(session.current_word, 1);
        assert!(session.errors.is_empty());
    }

    #[test]
    fn backspace_never_touches_counters() {
        let mut session = session_with(&["the"], TestOptions::default());

        session.apply_input("t");
        session.apply_input("te");
        session.apply_input("teh");
        let (correct, incorrect) = (session.correct_chars, session.incorrect_chars);

        session.apply_input("te");
        assert_eq!(session.current_char, 2);
        assert_eq!(session.correct_chars, correct);
        assert_eq!(session.incorrect_chars, incorrect);
    }

    #[test]
    fn retyping_a_corrected_char_scores_again() {
        // Effort scoring: the mistake and the correction both count.
        let mut session = session_with(&["the"], TestOptions::default());

        session.apply_input("x");
        assert_eq!(session.incorrect_chars, 1);

        session.apply_input("");
        session.apply_input("t");

        assert_eq!(session.incorrect_chars, 1);
        assert_eq!(session.correct_chars, 1);
    }

    #[test]
    fn chars_past_the_target_word_are_ignored() {
        let mut session = session_with(&["the"], TestOptions::default());

        session.apply_input("the");
        session.apply_input("thex");
        session.apply_input("thexx");

        assert_eq!(session.correct_chars, 3);
        assert_eq!(session.incorrect_chars, 0);
        assert_eq!(session.current_char, 5);
    }

    #[test]
    fn mismatched_word_is_marked_exactly_once() {
        let mut session = session_with(&["the", "quick"], TestOptions::default());

        session.apply_input("teh ");

        assert_eq!(session.incorrect_words, 1);
        assert_eq!(session.correct_words, 0);
        assert!(session.errors.contains(&0));
        assert_eq!(session.errors.len(), 1);
    }

    #[test]
    fn bare_space_skips_the_word_as_incorrect() {
        let mut session = session_with(&["the"], TestOptions::default());

        session.apply_input(" ");

        assert!(session.has_started());
        assert_eq!(session.incorrect_words, 1);
        assert!(session.errors.contains(&0));
        assert_eq!(session.current_word, 1);
    }

    #[test]
    fn words_mode_finishes_on_last_boundary() {
        let mut session = words_session(&["ab"], 10);

        for i in 0..10 {
            assert!(!session.has_finished(), "finished early at word {i}");
            session.apply_input("ab ");
        }

        assert!(session.has_finished());
        assert_eq!(session.correct_words, 10);
        // The 10th boundary ends the test; no 11th word is ever scored.
        assert_eq!(session.current_word, 9);

        session.apply_input("ab ");
        assert_eq!(session.correct_words, 10);
    }

    #[test]
    fn time_mode_word_boundaries_never_finish() {
        let mut session = session_with(
            &["ab"],
            TestOptions {
                mode: Mode::Time,
                word_count: 10,
                ..TestOptions::default()
            },
        );

        for _ in 0..12 {
            session.apply_input("ab ");
        }

        assert!(!session.has_finished());
        assert_eq!(session.current_word, 12);
    }

    #[test]
    fn input_after_finish_is_discarded() {
        let mut session = words_session(&["ab"], 10);
        for _ in 0..10 {
            session.apply_input("a");
            session.apply_input("ab");
            session.apply_input("ab ");
        }
        assert!(session.has_finished());
        assert_eq!(session.correct_chars, 20);

        session.apply_input("a");
        assert_eq!(session.input, "");
        assert_eq!(session.correct_chars, 20);
    }

    #[test]
    fn word_list_tops_up_near_the_end() {
        let mut session = session_with(&["ab"], TestOptions::default());
        assert_eq!(session.words.len(), INITIAL_BATCH);

        // Advance until only LOOKAHEAD words remain at the cursor.
        for _ in 0..INITIAL_BATCH - LOOKAHEAD {
            session.apply_input("ab ");
        }

        assert!(session.words.len() > INITIAL_BATCH);
        assert!(session.words.len() - session.current_word > LOOKAHEAD);
    }

    #[test]
    fn word_index_stays_in_bounds() {
        let mut session = session_with(&["ab"], TestOptions::default());

        for _ in 0..200 {
            session.apply_input("ab ");
            assert!(session.current_word < session.words.len());
        }
    }

    #[test]
    fn tick_before_start_is_a_no_op() {
        let mut session = session_with(&["the"], TestOptions::default());

        session.on_tick();

        assert!(!session.has_started());
        assert_eq!(session.seconds_elapsed, 0);
    }

    #[test]
    fn time_mode_finishes_once_the_deadline_passes() {
        let mut session = session_with(
            &["the"],
            TestOptions {
                mode: Mode::Time,
                duration_secs: 15,
                ..TestOptions::default()
            },
        );

        session.apply_input("t");
        session.started_at = Some(
            Instant::now()
                .checked_sub(Duration::from_secs(16))
                .unwrap(),
        );
        session.on_tick();

        assert!(session.has_finished());
        assert!(session.seconds_elapsed >= 15);
    }

    #[test]
    fn tick_after_finish_changes_nothing() {
        let mut session = words_session(&["ab"], 10);
        for _ in 0..10 {
            session.apply_input("ab ");
        }
        let elapsed = session.seconds_elapsed;

        session.started_at = Some(
            Instant::now()
                .checked_sub(Duration::from_secs(120))
                .unwrap(),
        );
        session.on_tick();

        assert_eq!(session.seconds_elapsed, elapsed);
    }

    #[test]
    fn restart_resets_everything() {
        let mut session = session_with(&["the"], TestOptions::default());
        session.apply_input("teh ");
        session.apply_input("x");

        session.restart();

        assert!(!session.has_started());
        assert!(!session.has_finished());
        assert_eq!(session.current_word, 0);
        assert_eq!(session.current_char, 0);
        assert_eq!(session.input, "");
        assert!(session.errors.is_empty());
        assert_eq!(session.correct_chars, 0);
        assert_eq!(session.incorrect_chars, 0);
        assert_eq!(session.correct_words, 0);
        assert_eq!(session.incorrect_words, 0);
        assert_eq!(session.seconds_elapsed, 0);
        assert_eq!(session.words.len(), INITIAL_BATCH);
    }

    #[test]
    fn restart_is_idempotent() {
        let mut session = words_session(&["ab"], 10);
        for _ in 0..10 {
            session.apply_input("ab ");
        }

        session.restart();
        let once = (
            session.words.len(),
            session.current_word,
            session.correct_chars,
            session.has_started(),
            session.has_finished(),
        );

        session.restart();
        let twice = (
            session.words.len(),
            session.current_word,
            session.correct_chars,
            session.has_started(),
            session.has_finished(),
        );

        assert_eq!(once, twice);
    }

    #[test]
    fn set_options_merges_partially_and_restarts() {
        let mut session = session_with(&["the"], TestOptions::default());
        session.apply_input("t");

        session.set_options(OptionsPatch {
            mode: Some(Mode::Words),
            word_count: Some(50),
            ..OptionsPatch::default()
        });

        assert_eq!(session.options.mode, Mode::Words);
        assert_eq!(session.options.word_count, 50);
        // Untouched field keeps its previous value.
        assert_eq!(session.options.duration_secs, 30);
        assert!(!session.has_started());
        assert_eq!(session.correct_chars, 0);
    }

    #[test]
    fn stats_reflect_counters() {
        let mut session = session_with(&["the"], TestOptions::default());
        session.apply_input("t");
        session.apply_input("tx");

        let stats = session.stats();
        assert_eq!(stats.correct_chars, 1);
        assert_eq!(stats.incorrect_chars, 1);
        assert_eq!(stats.accuracy, 50.0);
        // No full second elapsed yet.
        assert_eq!(stats.wpm, 0.0);
    }

    #[test]
    fn seconds_remaining_only_in_time_mode() {
        let session = session_with(&["the"], TestOptions::default());
        assert_eq!(session.seconds_remaining(), Some(30));

        let session = words_session(&["the"], 10);
        assert_eq!(session.seconds_remaining(), None);
    }
}

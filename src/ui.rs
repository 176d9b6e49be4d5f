use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::session::Mode;
use crate::time_series::WpmSeries;
use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

/// Completed words kept visible behind the cursor.
const WINDOW_BEFORE: usize = 5;
/// Upcoming words shown ahead of the cursor.
const WINDOW_AFTER: usize = 25;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Typing => render_typing(self, area, buf),
            AppState::Results => render_results(self, area, buf),
        }
    }
}

fn window_start(current_word: usize) -> usize {
    current_word.saturating_sub(WINDOW_BEFORE)
}

/// Axis upper bounds for the results chart. Keeps a little headroom so the
/// line never hugs the frame, and stays sane for one-sample series.
fn chart_bounds(series: &WpmSeries) -> (f64, f64) {
    let x = series.last_second().max(2.0);
    let y = (series.max_wpm() * 1.25).ceil().max(10.0);
    (x, y)
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let theme = &app.theme;

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(theme.dim);
    let accent_bold = Style::default().fg(theme.accent).patch(bold);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1), // header
            Constraint::Length(1),
            Constraint::Length(4), // words
            Constraint::Length(1),
            Constraint::Length(1), // live stats
            Constraint::Length(1),
            Constraint::Length(4), // keyboard
            Constraint::Length(1),
            Constraint::Length(1), // hints
            Constraint::Min(1),
        ])
        .split(area);

    // header: current options on the left, countdown or progress on the right
    let descriptor = match session.options.mode {
        Mode::Time => format!("{} {}s", session.options.mode, session.options.duration_secs),
        Mode::Words => format!("{} {}", session.options.mode, session.options.word_count),
    };
    let status = match session.options.mode {
        Mode::Time => format!("{}", session.seconds_remaining().unwrap_or(0)),
        Mode::Words => format!(
            "{}/{}",
            session.words_completed().min(session.options.word_count),
            session.options.word_count
        ),
    };
    let header = Line::from(vec![
        Span::styled(descriptor, dim),
        Span::raw("   "),
        Span::styled(status, accent_bold),
    ]);
    Paragraph::new(header)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    // word window around the cursor
    let start = window_start(session.current_word);
    let end = (session.current_word + WINDOW_AFTER).min(session.words.len());
    let mut spans: Vec<Span> = vec![];

    for idx in start..end {
        if idx > start {
            spans.push(Span::styled(" ", dim));
        }
        let word = &session.words[idx];

        if idx < session.current_word {
            let style = if session.errors.contains(&idx) {
                Style::default().fg(theme.incorrect).add_modifier(Modifier::DIM)
            } else {
                Style::default().fg(theme.correct).add_modifier(Modifier::DIM)
            };
            spans.push(Span::styled(word.clone(), style));
        } else if idx == session.current_word {
            spans.extend(current_word_spans(app, word));
        } else {
            spans.push(Span::styled(word.clone(), Style::default().fg(theme.untyped)));
        }
    }

    let window_text: String = (start..end).map(|i| session.words[i].as_str()).join(" ");
    let fits_one_line = window_text.width() <= chunks[3].width as usize;

    Paragraph::new(Line::from(spans))
        .alignment(if fits_one_line {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);

    let stats = session.stats();
    Paragraph::new(Span::styled(
        format!(
            "{} wpm   {}% acc   {}s",
            stats.wpm, stats.accuracy, stats.seconds_elapsed
        ),
        bold,
    ))
    .alignment(Alignment::Center)
    .render(chunks[5], buf);

    Paragraph::new(keyboard_lines(app))
        .alignment(Alignment::Center)
        .render(chunks[7], buf);

    let hints = ["tab mode", "↑/↓ value", "← restart", "esc quit"]
        .iter()
        .join("  ·  ");
    Paragraph::new(Span::styled(
        hints,
        dim.add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[9], buf);
}

/// Per-char coloring of the word under the cursor: typed positions show the
/// typed character against the target, the cursor position is underlined,
/// extra characters past the target are displayed but never scored.
fn current_word_spans<'a>(app: &App, word: &str) -> Vec<Span<'a>> {
    let theme = &app.theme;
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let target: Vec<char> = word.chars().collect();
    let typed: Vec<char> = app.session.input.chars().collect();
    let mut spans = Vec::with_capacity(target.len().max(typed.len()));

    for i in 0..target.len().max(typed.len()) {
        match (typed.get(i), target.get(i)) {
            (Some(&t), Some(&e)) => {
                let style = if t == e {
                    Style::default().fg(theme.correct).patch(bold)
                } else {
                    Style::default().fg(theme.incorrect).patch(bold)
                };
                let shown = if t == e { e } else { t };
                spans.push(Span::styled(shown.to_string(), style));
            }
            // typed past the end of the target word
            (Some(&t), None) => {
                spans.push(Span::styled(
                    t.to_string(),
                    Style::default()
                        .fg(theme.incorrect)
                        .add_modifier(Modifier::DIM),
                ));
            }
            (None, Some(&e)) => {
                let style = if i == app.session.current_char {
                    Style::default()
                        .fg(theme.cursor)
                        .patch(bold)
                        .add_modifier(Modifier::UNDERLINED)
                } else {
                    Style::default().fg(theme.untyped)
                };
                spans.push(Span::styled(e.to_string(), style));
            }
            (None, None) => unreachable!(),
        }
    }

    spans
}

fn keyboard_lines<'a>(app: &App) -> Vec<Line<'a>> {
    let theme = &app.theme;

    let rows: [&[&str]; 4] = [
        &["Q", "W", "E", "R", "T", "Y", "U", "I", "O", "P"],
        &["A", "S", "D", "F", "G", "H", "J", "K", "L"],
        &["Z", "X", "C", "V", "B", "N", "M", "Backspace"],
        &["Space"],
    ];

    rows.iter()
        .map(|row| {
            let spans = row
                .iter()
                .map(|label| {
                    let text = match *label {
                        "Space" => "      space      ".to_string(),
                        "Backspace" => " bksp ".to_string(),
                        key => format!(" {} ", key.to_lowercase()),
                    };
                    if app.keyboard.active_keys.contains(*label) {
                        Span::styled(
                            text,
                            Style::default()
                                .fg(theme.key_active_fg)
                                .bg(theme.key_active_bg)
                                .add_modifier(Modifier::BOLD),
                        )
                    } else {
                        Span::styled(text, Style::default().fg(theme.key_idle))
                    }
                })
                .collect_vec();
            Line::from(spans)
        })
        .collect_vec()
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let theme = &app.theme;

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim_italic = Style::default()
        .fg(theme.dim)
        .add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // chart
            Constraint::Length(1), // headline stats
            Constraint::Length(1), // counters
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    if session.wpm_series.is_empty() {
        Paragraph::new(Span::styled("finished before the first second", dim_italic))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);
    } else {
        let (x_max, y_max) = chart_bounds(&session.wpm_series);
        let points = session
            .wpm_series
            .points()
            .iter()
            .map(|p| (p.t, p.wpm))
            .collect_vec();
        let datasets = vec![Dataset::default()
            .marker(ratatui::symbols::Marker::Braille)
            .style(Style::default().fg(theme.accent))
            .graph_type(GraphType::Line)
            .data(&points)];

        Chart::new(datasets)
            .x_axis(
                Axis::default()
                    .title("seconds")
                    .bounds([1.0, x_max])
                    .labels(vec![
                        Span::styled("1", bold),
                        Span::styled(format!("{x_max:.0}"), bold),
                    ]),
            )
            .y_axis(
                Axis::default()
                    .title("wpm")
                    .bounds([0.0, y_max])
                    .labels(vec![
                        Span::styled("0", bold),
                        Span::styled(format!("{y_max:.0}"), bold),
                    ]),
            )
            .render(chunks[0], buf);
    }

    let stats = session.stats();
    Paragraph::new(Span::styled(
        format!(
            "{} wpm   {}% acc   {} raw   {} net",
            stats.wpm, stats.accuracy, stats.raw_wpm, stats.net_wpm
        ),
        bold,
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!(
            "chars {}/{}   words {}/{}   {}s",
            stats.correct_chars,
            stats.incorrect_chars,
            stats.correct_words,
            stats.incorrect_words,
            stats.seconds_elapsed
        ),
        Style::default().fg(theme.dim),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    Paragraph::new(Span::styled("(r)estart  (esc)ape", dim_italic))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);
}

use std::collections::VecDeque;
use text_localizer::{localize, text_direction, TextDirection};
use ticket_call::{ticket_key, DisplayedCall};
use tokio::sync::watch;
use tracing::debug;

pub const DEFAULT_BOARD_ROWS: usize = 6;

const RTL_ISOLATE: char = '\u{2067}';
const POP_ISOLATE: char = '\u{2069}';

/// One line on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardRow {
    pub ticket_number: String,
    pub counter_number: String,
    pub called_at_timestamp: i64,
    pub highlighted: bool,
}

/// Recent calls, newest first, with the call being announced highlighted.
#[derive(Debug, Clone)]
pub struct DisplayBoard {
    capacity: usize,
    languages: Vec<String>,
    rows: VecDeque<DisplayedCall>,
    current: Option<DisplayedCall>,
}

impl DisplayBoard {
    pub fn new(capacity: usize, languages: Vec<String>) -> Self {
        Self {
            capacity: capacity.max(1),
            languages,
            rows: VecDeque::new(),
            current: None,
        }
    }

    pub fn current(&self) -> Option<&DisplayedCall> {
        self.current.as_ref()
    }

    /// Apply a new display value. Returns true when the board changed.
    ///
    /// `None` keeps the history and only clears the highlight.
    pub fn apply(&mut self, call: Option<DisplayedCall>) -> bool {
        if call == self.current {
            return false;
        }
        if let Some(call) = &call {
            let key = ticket_key(&call.ticket_number);
            self.rows.retain(|row| ticket_key(&row.ticket_number) != key);
            self.rows.push_front(call.clone());
            self.rows.truncate(self.capacity);
        }
        self.current = call;
        true
    }

    pub fn rows(&self) -> Vec<BoardRow> {
        self.rows
            .iter()
            .map(|row| BoardRow {
                ticket_number: row.ticket_number.clone(),
                counter_number: row.counter_number.clone(),
                called_at_timestamp: row.called_at_timestamp,
                highlighted: self.current.as_ref() == Some(row),
            })
            .collect()
    }

    /// The current call as a sentence per board language, RTL text isolated.
    pub fn captions(&self) -> Vec<String> {
        let Some(current) = &self.current else {
            return Vec::new();
        };
        self.languages
            .iter()
            .map(|lang| {
                let text = localize(&current.ticket_number, &current.counter_number, lang);
                match text_direction(lang) {
                    TextDirection::Ltr => text,
                    TextDirection::Rtl => format!("{RTL_ISOLATE}{text}{POP_ISOLATE}"),
                }
            })
            .collect()
    }

    /// Plain-text rendering: captions first, then one line per row.
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = self.captions();
        for row in self.rows() {
            let marker = if row.highlighted { ">" } else { " " };
            lines.push(format!(
                "{marker} {:<12} {:>6}",
                row.ticket_number, row.counter_number
            ));
        }
        lines
    }

    /// Wait for the next display change and apply it.
    /// Returns false once the sequencer has gone away.
    pub async fn follow(&mut self, rx: &mut watch::Receiver<Option<DisplayedCall>>) -> bool {
        if rx.changed().await.is_err() {
            return false;
        }
        let call = rx.borrow_and_update().clone();
        if self.apply(call) {
            debug!(rows = self.rows.len(), "display board updated");
        }
        true
    }
}

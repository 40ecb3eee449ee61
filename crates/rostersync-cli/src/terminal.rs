//! Terminal host for the sync loop.
//!
//! `TerminalSink` keeps the last rendered cell per member and redraws the
//! whole table on flush. Member names are not part of the sink contract, so
//! `NamedSource` records them as rosters pass through.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};

use rostersync_core::storage::ColorsConfig;
use rostersync_core::{ColorHint, FactionId, FetchError, MemberId, Roster, RosterSource, StatusSink};

pub type NameBook = Arc<Mutex<HashMap<MemberId, String>>>;

/// Roster source that remembers member names for display.
pub struct NamedSource<S> {
    inner: S,
    names: NameBook,
}

impl<S> NamedSource<S> {
    pub fn new(inner: S, names: NameBook) -> Self {
        Self { inner, names }
    }
}

#[async_trait]
impl<S: RosterSource> RosterSource for NamedSource<S> {
    async fn fetch_roster(&self, faction_id: &FactionId) -> Result<Roster, FetchError> {
        let roster = self.inner.fetch_roster(faction_id).await?;
        if let Ok(mut names) = self.names.lock() {
            for status in roster.values() {
                if let Some(name) = &status.name {
                    names.insert(status.member_id.clone(), name.clone());
                }
            }
        }
        Ok(roster)
    }
}

#[derive(Debug, Clone)]
struct Cell {
    text: String,
    color: ColorHint,
    sort_weight: i64,
}

/// One printed line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub member_id: MemberId,
    pub name: Option<String>,
    pub status: String,
    pub color: ColorHint,
    pub sort_weight: i64,
}

pub struct TerminalSink {
    colors: ColorsConfig,
    names: NameBook,
    cells: HashMap<MemberId, Cell>,
    order: Vec<MemberId>,
    /// Redraw on flush. Off for JSON output.
    draw: bool,
    dirty: bool,
}

impl TerminalSink {
    pub fn new(colors: ColorsConfig, names: NameBook, draw: bool) -> Self {
        Self {
            colors,
            names,
            cells: HashMap::new(),
            order: Vec::new(),
            draw,
            dirty: false,
        }
    }

    /// Rows in display order.
    pub fn rows(&self) -> Vec<Row> {
        let names = self.names.lock().ok();
        self.order
            .iter()
            .filter_map(|id| {
                let cell = self.cells.get(id)?;
                Some(Row {
                    member_id: id.clone(),
                    name: names.as_ref().and_then(|n| n.get(id).cloned()),
                    status: cell.text.clone(),
                    color: cell.color,
                    sort_weight: cell.sort_weight,
                })
            })
            .collect()
    }

    pub fn render_table(&self) -> String {
        let mut out = String::new();
        for row in self.rows() {
            let label = match &row.name {
                Some(name) => format!("{name} [{}]", row.member_id),
                None => format!("[{}]", row.member_id),
            };
            let color = ansi_color(self.colors.hex_for(row.color)).unwrap_or_default();
            out.push_str(&format!("{label:<32} {color}{}{RESET}\n", row.status));
        }
        out
    }
}

const RESET: &str = "\x1b[0m";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Truecolor foreground escape for `#RRGGBB`.
fn ansi_color(hex: &str) -> Option<String> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    Some(format!(
        "\x1b[38;2;{};{};{}m",
        channel(0)?,
        channel(2)?,
        channel(4)?
    ))
}

impl StatusSink for TerminalSink {
    fn set_status_cell(&mut self, member_id: &MemberId, text: &str, color: ColorHint, sort_weight: i64) {
        self.cells.insert(
            member_id.clone(),
            Cell {
                text: text.to_string(),
                color,
                sort_weight,
            },
        );
        self.dirty = true;
    }

    fn apply_order(&mut self, ordered: &[MemberId]) {
        self.order = ordered.to_vec();
        // members no longer listed have left the roster
        self.cells.retain(|id, _| ordered.contains(id));
        self.dirty = true;
    }

    fn flush(&mut self) {
        if !self.draw || !self.dirty {
            return;
        }
        self.dirty = false;
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = write!(stdout, "{CLEAR_SCREEN}{}", self.render_table()).and_then(|_| stdout.flush()) {
            tracing::warn!(error = %e, "failed to draw roster");
        }
    }

    fn clear(&mut self) {
        self.cells.clear();
        self.order.clear();
        self.dirty = true;
    }
}

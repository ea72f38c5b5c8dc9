use std::fmt;

use tracing::warn;

use crate::models::{DaySession, RemovedEntry, ScheduleEntry, ScheduleResult, SlotKey, Weekday};

const SESSIONS: usize = 3;
const EMPTY_MARKER: &str = "-";

/// Contents of one weekday/session cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Empty,
    Entries(&'a [ScheduleEntry]),
}

impl Cell<'_> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// A schedule result laid out as 7 days x 3 sessions. Entries keep their
/// arrival order inside a cell; nothing is merged, reordered or dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct TimetableGrid {
    cells: Vec<Vec<ScheduleEntry>>,
    unplaced: Vec<ScheduleEntry>,
    removed: Vec<RemovedEntry>,
    cost: f64,
}

fn offset(key: SlotKey) -> usize {
    key.day.index() * SESSIONS + key.session.index()
}

impl TimetableGrid {
    pub fn from_result(result: &ScheduleResult) -> Self {
        let mut cells = vec![Vec::new(); Weekday::ALL.len() * SESSIONS];
        let mut unplaced = Vec::new();

        for entry in &result.schedule {
            match entry.time.parse::<SlotKey>() {
                Ok(key) => cells[offset(key)].push(entry.clone()),
                Err(_) => {
                    warn!("entry {} has unrecognised slot {}", entry.subject, entry.time);
                    unplaced.push(entry.clone());
                }
            }
        }

        Self {
            cells,
            unplaced,
            removed: result.removed_conflicts.clone(),
            cost: result.cost,
        }
    }

    pub fn cell(&self, key: SlotKey) -> Cell<'_> {
        let entries = &self.cells[offset(key)];
        if entries.is_empty() {
            Cell::Empty
        } else {
            Cell::Entries(entries)
        }
    }

    /// Keys of non-empty cells, in grid order.
    pub fn populated(&self) -> Vec<SlotKey> {
        SlotKey::all().filter(|key| !self.cell(*key).is_empty()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Vec::is_empty)
    }

    pub fn unplaced(&self) -> &[ScheduleEntry] {
        &self.unplaced
    }

    pub fn removed(&self) -> &[RemovedEntry] {
        &self.removed
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    fn cell_text(&self, key: SlotKey) -> String {
        match self.cell(key) {
            Cell::Empty => EMPTY_MARKER.to_string(),
            Cell::Entries(entries) => entries
                .iter()
                .map(|e| e.subject.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Box-drawing pieces for the text table.
enum TabChar {
    Bv,
    Bh,
    Jl,
    Jr,
    Jtl,
    Jtr,
    Jbl,
    Jbr,
    Jtb,
    Jtt,
    Jm,
}

impl TabChar {
    fn val(&self) -> char {
        match self {
            TabChar::Bv => '│',
            TabChar::Bh => '─',
            TabChar::Jl => '├',
            TabChar::Jr => '┤',
            TabChar::Jtl => '┌',
            TabChar::Jtr => '┐',
            TabChar::Jbl => '└',
            TabChar::Jbr => '┘',
            TabChar::Jtb => '┬',
            TabChar::Jtt => '┴',
            TabChar::Jm => '┼',
        }
    }
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

fn rule(widths: &[usize], left: TabChar, mid: TabChar, right: TabChar) -> String {
    let segments: Vec<String> = widths
        .iter()
        .map(|w| TabChar::Bh.val().to_string().repeat(w + 2))
        .collect();
    format!(
        "{}{}{}",
        left.val(),
        segments.join(&mid.val().to_string()),
        right.val()
    )
}

fn row(cells: &[String], widths: &[usize]) -> String {
    let bar = TabChar::Bv.val();
    let body: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(text, width)| format!(" {} ", pad(text, *width)))
        .collect();
    format!("{}{}{}", bar, body.join(&bar.to_string()), bar)
}

impl fmt::Display for TimetableGrid {
    /// One row per session, one column per weekday.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines: Vec<Vec<String>> = Vec::with_capacity(SESSIONS + 1);
        let mut header = vec![String::new()];
        header.extend(Weekday::ALL.iter().map(|d| d.label().to_string()));
        lines.push(header);

        for session in DaySession::ALL {
            let mut line = vec![session.label().to_string()];
            line.extend(
                Weekday::ALL
                    .into_iter()
                    .map(|day| self.cell_text(SlotKey::new(day, session))),
            );
            lines.push(line);
        }

        let columns = lines[0].len();
        let widths: Vec<usize> = (0..columns)
            .map(|c| lines.iter().map(|l| l[c].chars().count()).max().unwrap_or(0))
            .collect();

        writeln!(f, "{}", rule(&widths, TabChar::Jtl, TabChar::Jtb, TabChar::Jtr))?;
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                writeln!(f, "{}", rule(&widths, TabChar::Jl, TabChar::Jm, TabChar::Jr))?;
            }
            writeln!(f, "{}", row(line, &widths))?;
        }
        write!(f, "{}", rule(&widths, TabChar::Jbl, TabChar::Jtt, TabChar::Jbr))
    }
}

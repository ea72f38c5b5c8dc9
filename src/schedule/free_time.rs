use crate::error::AppError;
use crate::models::{DaySession, SlotKey, Weekday};

const SLOT_COUNT: usize = 7 * 3;

/// Availability per weekday and session. Starts with nothing available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeTimeGrid {
    slots: [bool; SLOT_COUNT],
}

impl Default for FreeTimeGrid {
    fn default() -> Self {
        Self {
            slots: [false; SLOT_COUNT],
        }
    }
}

fn offset(key: SlotKey) -> usize {
    key.day.index() * DaySession::ALL.len() + key.session.index()
}

impl FreeTimeGrid {
    pub fn all_available() -> Self {
        Self {
            slots: [true; SLOT_COUNT],
        }
    }

    /// Builds a grid from wire tokens such as `T2_Sáng`.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut grid = Self::default();
        for token in tokens {
            let key: SlotKey = token.as_ref().parse()?;
            grid.set(key, true);
        }
        Ok(grid)
    }

    pub fn is_available(&self, key: SlotKey) -> bool {
        self.slots[offset(key)]
    }

    pub fn set(&mut self, key: SlotKey, available: bool) {
        self.slots[offset(key)] = available;
    }

    pub fn toggle(&mut self, key: SlotKey) -> bool {
        let slot = &mut self.slots[offset(key)];
        *slot = !*slot;
        *slot
    }

    pub fn set_day(&mut self, day: Weekday, available: bool) {
        for session in DaySession::ALL {
            self.set(SlotKey::new(day, session), available);
        }
    }

    /// Available slots as wire tokens, day-major then session.
    pub fn available_tokens(&self) -> Vec<String> {
        SlotKey::all()
            .filter(|key| self.is_available(*key))
            .map(|key| key.to_string())
            .collect()
    }
}

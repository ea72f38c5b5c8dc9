pub mod credits;
pub mod free_time;
pub mod grid;
pub mod priority;
pub mod request;
pub mod selection;

pub use credits::CreditRange;
pub use free_time::FreeTimeGrid;
pub use grid::{Cell, TimetableGrid};
pub use priority::{priority_at, priority_for};
pub use request::build_request;
pub use selection::SelectionList;

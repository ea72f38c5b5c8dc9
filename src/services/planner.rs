use std::sync::Arc;

use tracing::{info, warn};

use crate::api::SchedulerApi;
use crate::error::AppError;
use crate::models::{ConstraintToggles, ScheduleRequest, ScheduleResult};
use crate::schedule::{CreditRange, FreeTimeGrid, SelectionList, TimetableGrid, build_request};

pub const SCHEDULE_ERROR_MESSAGE: &str = "Could not generate a schedule. Please try again.";

/// Scheduling form: selection, availability, preferences, and the last
/// result returned by the optimizer.
pub struct SchedulePlanner {
    api: Arc<dyn SchedulerApi>,
    pub selection: SelectionList,
    pub free_time: FreeTimeGrid,
    pub toggles: ConstraintToggles,
    pub credits: CreditRange,
    result: Option<ScheduleResult>,
    notice: Option<String>,
}

impl SchedulePlanner {
    pub fn new(api: Arc<dyn SchedulerApi>) -> Self {
        Self {
            api,
            selection: SelectionList::new(),
            free_time: FreeTimeGrid::default(),
            toggles: ConstraintToggles::default(),
            credits: CreditRange::default(),
            result: None,
            notice: None,
        }
    }

    pub fn result(&self) -> Option<&ScheduleResult> {
        self.result.as_ref()
    }

    pub fn grid(&self) -> Option<TimetableGrid> {
        self.result.as_ref().map(TimetableGrid::from_result)
    }

    /// Message blocking or explaining the last submission, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn preview_request(&self) -> Result<ScheduleRequest, AppError> {
        build_request(self.selection.subjects(), &self.free_time, self.toggles)
    }

    /// Validates locally, then asks the optimizer for a timetable. Local
    /// validation failures never reach the network.
    pub async fn submit(&mut self) -> Result<TimetableGrid, AppError> {
        let request = match self.preview_request() {
            Ok(request) => request,
            Err(e) => {
                self.notice = Some(e.user_message(SCHEDULE_ERROR_MESSAGE));
                return Err(e);
            }
        };

        match self.api.generate_schedule(&request).await {
            Ok(result) => {
                info!(
                    "schedule generated: {} placed, {} removed, cost {}",
                    result.schedule.len(),
                    result.removed_conflicts.len(),
                    result.cost
                );
                let grid = TimetableGrid::from_result(&result);
                self.result = Some(result);
                self.notice = None;
                Ok(grid)
            }
            Err(e) => {
                warn!("schedule request failed: {}", e);
                self.notice = Some(e.user_message(SCHEDULE_ERROR_MESSAGE));
                Err(e)
            }
        }
    }
}

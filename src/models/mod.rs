pub mod chat;
pub mod course;
pub mod schedule;
pub mod timeslot;
pub mod user;

pub use chat::{ChatMessage, Role};
pub use course::{Course, CourseFile, CourseFilter, CourseUpload, NewCourseRequest, UploadSummary};
pub use schedule::{
    ConstraintToggles, RemovedEntry, ScheduleEntry, ScheduleRequest, ScheduleResult,
    SelectedSubject, SubjectPayload,
};
pub use timeslot::{DaySession, SlotKey, Weekday};
pub use user::{Credentials, Profile, RegisterRequest};

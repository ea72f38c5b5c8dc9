pub mod admin;
pub mod auth;
pub mod catalog;
pub mod chat;
pub mod planner;

pub use admin::{AdminConsole, ManualCourseInput, Notice, NoticeKind};
pub use auth::{LoginForm, RegisterForm};
pub use catalog::CourseCatalog;
pub use chat::ChatAssistant;
pub use planner::SchedulePlanner;

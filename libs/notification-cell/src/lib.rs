pub mod error;
pub mod handlers;
pub mod models;
pub mod planner;
pub mod router;
pub mod services;

pub use error::NotificationError;
pub use models::{NewNotification, Notification, NotificationEvent, NotificationRole};
pub use planner::plan_notifications;
pub use router::notification_routes;
pub use services::{NotificationFanout, NotificationService};

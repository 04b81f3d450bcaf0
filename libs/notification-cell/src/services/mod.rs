pub mod fanout;
pub mod notifications;

pub use fanout::NotificationFanout;
pub use notifications::NotificationService;

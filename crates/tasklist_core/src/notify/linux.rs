use crate::error::AppError;
use crate::notify::{Notifier, body, headline};
use crate::overdue::OverdueReport;
use notify_rust::Notification;

pub struct LinuxNotifier;

impl Notifier for LinuxNotifier {
    fn notify_overdue(&self, report: &OverdueReport) -> Result<(), AppError> {
        let mut notification = Notification::new();
        notification.summary(&headline(report));
        notification.body(&body(report));
        notification.appname("tasklist");

        notification
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}

use crate::error::AppError;
use crate::notify::{Notifier, headline};
use crate::overdue::OverdueReport;
use tauri_winrt_notification::Toast;

pub struct WindowsNotifier;

impl Notifier for WindowsNotifier {
    fn notify_overdue(&self, report: &OverdueReport) -> Result<(), AppError> {
        let lines = report.lines();
        let first = lines.first().cloned().unwrap_or_default();
        let rest = if lines.len() > 1 {
            format!("and {} more", lines.len() - 1)
        } else {
            String::new()
        };

        Toast::new(Toast::POWERSHELL_APP_ID)
            .title(&headline(report))
            .text1(&first)
            .text2(&rest)
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}

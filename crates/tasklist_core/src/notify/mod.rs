use crate::error::AppError;
use crate::overdue::OverdueReport;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxNotifier;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsNotifier;

pub const DISABLE_ENV_VAR: &str = "TASKLIST_DISABLE_NOTIFICATIONS";
const HEADLINE: &str = "Overdue tasks detected";

/// Delivers one overdue report as one notification.
pub trait Notifier {
    fn notify_overdue(&self, report: &OverdueReport) -> Result<(), AppError>;
}

pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify_overdue(&self, _report: &OverdueReport) -> Result<(), AppError> {
        Ok(())
    }
}

/// Picks the desktop notifier unless notifications are turned off by config
/// or by the environment. Platforms without one fall back to the no-op.
pub fn notifier_from_env(enabled: bool) -> Result<Box<dyn Notifier>, AppError> {
    if !enabled || std::env::var(DISABLE_ENV_VAR).is_ok() {
        return Ok(Box::new(NoopNotifier));
    }

    match platform_notifier() {
        Ok(notifier) => Ok(notifier),
        Err(err) => match err {
            AppError::InvalidData(_) => Ok(Box::new(NoopNotifier)),
            other => Err(other),
        },
    }
}

pub fn headline(report: &OverdueReport) -> String {
    format!("{HEADLINE} ({})", report.len())
}

/// Body text listing every overdue task on its own line.
pub fn body(report: &OverdueReport) -> String {
    report.lines().join("\n")
}

#[cfg(target_os = "linux")]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(LinuxNotifier))
}

#[cfg(windows)]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(WindowsNotifier))
}

#[cfg(not(any(target_os = "linux", windows)))]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Err(AppError::invalid_data(
        "notifications are not supported on this platform",
    ))
}

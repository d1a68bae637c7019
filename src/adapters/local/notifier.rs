use crate::ports::{Notice, NoticeLevel, Notifier};

/// Tracing target for user-facing notices, so they can be filtered apart
/// from diagnostics
pub const NOTICE_TARGET: &str = "memetrader::notice";

/// Emits notices as tracing events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        let body = notice.body.as_deref().unwrap_or("");
        match notice.level {
            NoticeLevel::Success => {
                tracing::info!(target: NOTICE_TARGET, body, "✔ {}", notice.title)
            }
            NoticeLevel::Info => tracing::info!(target: NOTICE_TARGET, body, "{}", notice.title),
            NoticeLevel::Error => {
                tracing::error!(target: NOTICE_TARGET, body, "✖ {}", notice.title)
            }
        }
    }
}

//! Local Adapters
//!
//! Side effects that stay on this machine: export files and notices.

mod export;
mod notifier;

pub use export::FileExportSink;
pub use notifier::{TracingNotifier, NOTICE_TARGET};

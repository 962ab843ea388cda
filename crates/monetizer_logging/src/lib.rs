#![deny(missing_docs)]
//! Shared logging utilities for the monetizer workspace.
//!
//! This crate provides the `monetizer_*` logging macros used across the
//! codebase, a thread-local label for the document currently being
//! processed, and a minimal test initializer for the global logger.

use std::cell::RefCell;

thread_local! {
    /// Label of the document the current thread is monetizing.
    static CURRENT_DOCUMENT: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Sets the document label for the current thread.
/// Batch workers call this before handing a document to the router.
pub fn set_current_document(label: impl Into<String>) {
    let label = label.into();
    CURRENT_DOCUMENT.with(|v| *v.borrow_mut() = Some(label));
}

/// Clears the document label for the current thread.
pub fn clear_current_document() {
    CURRENT_DOCUMENT.with(|v| *v.borrow_mut() = None);
}

/// Retrieves the document label for the current thread, or `"-"` when unset.
pub fn current_document() -> String {
    CURRENT_DOCUMENT.with(|v| v.borrow().clone().unwrap_or_else(|| "-".to_string()))
}

/// Guard that labels the current thread with a document and clears the
/// label again when dropped.
#[must_use = "the document label is cleared as soon as the scope is dropped"]
pub struct DocumentScope {
    _private: (),
}

impl DocumentScope {
    /// Labels the current thread with `label` until the guard is dropped.
    pub fn enter(label: impl Into<String>) -> Self {
        set_current_document(label);
        Self { _private: () }
    }
}

impl Drop for DocumentScope {
    fn drop(&mut self) {
        clear_current_document();
    }
}

/// Logs a trace-level message prefixed with the current document label.
#[macro_export]
macro_rules! monetizer_trace {
    ($($arg:tt)*) => {{
        log::trace!("[{}] {}", $crate::current_document(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message prefixed with the current document label.
#[macro_export]
macro_rules! monetizer_debug {
    ($($arg:tt)*) => {{
        log::debug!("[{}] {}", $crate::current_document(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message prefixed with the current document label.
#[macro_export]
macro_rules! monetizer_info {
    ($($arg:tt)*) => {{
        log::info!("[{}] {}", $crate::current_document(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message prefixed with the current document label.
#[macro_export]
macro_rules! monetizer_warn {
    ($($arg:tt)*) => {{
        log::warn!("[{}] {}", $crate::current_document(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message prefixed with the current document label.
#[macro_export]
macro_rules! monetizer_error {
    ($($arg:tt)*) => {{
        log::error!("[{}] {}", $crate::current_document(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Another test may already own the global logger.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_scope_sets_and_clears_label() {
        assert_eq!(current_document(), "-");
        {
            let _scope = DocumentScope::enter("post-42.html");
            assert_eq!(current_document(), "post-42.html");
        }
        assert_eq!(current_document(), "-");
    }
}

use crate::traits::ErrorRecord;
use std::sync::Arc;

pub type OpenHook = Arc<dyn Fn() + Send + Sync>;
pub type CloseHook = Arc<dyn Fn() + Send + Sync>;
pub type MessageHook<T> = Arc<dyn Fn(&T) + Send + Sync>;
pub type ErrorHook = Arc<dyn Fn(&ErrorRecord) + Send + Sync>;

/// Side-effect hooks invoked by the session's event task
///
/// Each hook fires at most once per corresponding transition and never after
/// teardown. Hooks run on the event task, so they should return quickly.
pub struct SessionHooks<T> {
    pub(crate) on_open: Option<OpenHook>,
    pub(crate) on_message: Option<MessageHook<T>>,
    pub(crate) on_error: Option<ErrorHook>,
    pub(crate) on_close: Option<CloseHook>,
}

impl<T> SessionHooks<T> {
    pub fn new() -> Self {
        Self {
            on_open: None,
            on_message: None,
            on_error: None,
            on_close: None,
        }
    }

    pub(crate) fn open(&self) {
        if let Some(hook) = &self.on_open {
            hook();
        }
    }

    pub(crate) fn message(&self, message: &T) {
        if let Some(hook) = &self.on_message {
            hook(message);
        }
    }

    pub(crate) fn error(&self, record: &ErrorRecord) {
        if let Some(hook) = &self.on_error {
            hook(record);
        }
    }

    pub(crate) fn close(&self) {
        if let Some(hook) = &self.on_close {
            hook();
        }
    }
}

impl<T> Default for SessionHooks<T> {
    fn default() -> Self {
        Self::new()
    }
}

//! Scoped override of the ambient call deadline

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use super::environment::{Environment, API_DEADLINE_KEY};

/// RAII guard that extends the sandbox deadline for the duration of a call.
///
/// On creation the current deadline attribute is saved and replaced; on drop
/// the saved value is written back, or the attribute is removed if there was
/// none. Restoration therefore happens on every exit path, including `?`
/// early returns and panics.
///
/// When no environment is available (outside a request context) the guard is
/// a no-op.
pub struct DeadlineGuard {
    environment: Option<Environment>,
    previous: Option<Value>,
}

impl DeadlineGuard {
    /// Override the deadline attribute with `deadline` (in seconds).
    pub fn extend(environment: Option<&Environment>, deadline: Duration) -> Self {
        let previous = environment.and_then(|env| env.put(API_DEADLINE_KEY, deadline.as_secs_f64()));
        if environment.is_some() {
            debug!(
                "Extended sandbox deadline to {}s (previous: {:?})",
                deadline.as_secs_f64(),
                previous
            );
        }
        Self {
            environment: environment.cloned(),
            previous,
        }
    }

    /// The value that will be restored when the guard is dropped
    pub fn previous(&self) -> Option<&Value> {
        self.previous.as_ref()
    }
}

impl Drop for DeadlineGuard {
    fn drop(&mut self) {
        let Some(env) = &self.environment else {
            return;
        };
        match self.previous.take() {
            Some(value) => {
                env.put(API_DEADLINE_KEY, value);
            }
            None => {
                env.remove(API_DEADLINE_KEY);
            }
        }
    }
}

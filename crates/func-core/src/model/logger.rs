use log::{debug, error, info, warn, Level};
use uuid::Uuid;

use crate::constants::INVOCATION_LOG_TARGET;

/// Handle de logging ligado a una invocación.
///
/// Escribe sobre la fachada `log`; el sink concreto lo decide la aplicación.
#[derive(Debug, Clone)]
pub struct InvocationLogger {
    invocation_id: Uuid,
    function_name: String,
}

impl InvocationLogger {
    pub fn new(invocation_id: Uuid, function_name: impl Into<String>) -> Self {
        Self { invocation_id,
               function_name: function_name.into() }
    }

    pub fn log(&self, level: Level, message: &str) {
        match level {
            Level::Error => error!(target: INVOCATION_LOG_TARGET, "[{}] {}: {}", self.invocation_id, self.function_name, message),
            Level::Warn => warn!(target: INVOCATION_LOG_TARGET, "[{}] {}: {}", self.invocation_id, self.function_name, message),
            Level::Info => info!(target: INVOCATION_LOG_TARGET, "[{}] {}: {}", self.invocation_id, self.function_name, message),
            Level::Debug | Level::Trace => {
                debug!(target: INVOCATION_LOG_TARGET, "[{}] {}: {}", self.invocation_id, self.function_name, message)
            }
        }
    }

    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }
}

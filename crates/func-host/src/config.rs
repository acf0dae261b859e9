//! Configuración del host desde variables de entorno (`.env` incluido).
//!
//! Variables:
//! - `FUNCTION_TIMEOUT_SECS`: timeout por defecto; ausente o `0` = sin timeout.
//! - `FUNCTION_TIMEOUT_THROW`: error de timeout dedicado (default `true`).
//! - `FUNCTION_TIMEOUT_ENFORCE_DEBUG`: aplicar el timeout con debugger (default `false`).
//! - `FUNCTION_TIMEOUT_GRACE_MS`: gracia concedida al body huérfano (default `2000`).
//! - `FUNCTIONS_DEBUGGING`: fuerza el modo debugging; si falta se sondea el proceso.

use std::env;
use std::time::Duration;

use dotenvy::dotenv;
use func_core::constants::DEFAULT_TIMEOUT_GRACE_PERIOD;
use func_core::TimeoutConfig;
use once_cell::sync::Lazy;

use crate::debug::debugger_attached;
use crate::error::HostError;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Timeout para funciones que no declaran uno propio.
    pub default_timeout: Option<TimeoutConfig>,
    pub grace_period: Duration,
    pub debugging: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self { default_timeout: None,
               grace_period: DEFAULT_TIMEOUT_GRACE_PERIOD,
               debugging: false }
    }
}

impl HostConfig {
    pub fn from_env() -> Result<Self, HostError> {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero leyendo de una fuente arbitraria (tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HostError>
        where F: Fn(&str) -> Option<String>
    {
        let secs: u64 = parse_var(&lookup, "FUNCTION_TIMEOUT_SECS")?.unwrap_or(0);
        let throw = parse_bool(&lookup, "FUNCTION_TIMEOUT_THROW")?.unwrap_or(true);
        let enforce = parse_bool(&lookup, "FUNCTION_TIMEOUT_ENFORCE_DEBUG")?.unwrap_or(false);
        let grace_ms: Option<u64> = parse_var(&lookup, "FUNCTION_TIMEOUT_GRACE_MS")?;
        let debugging = match parse_bool(&lookup, "FUNCTIONS_DEBUGGING")? {
            Some(v) => v,
            None => debugger_attached(),
        };

        let default_timeout = (secs > 0).then(|| {
                                            TimeoutConfig::new(Duration::from_secs(secs)).throw_on_timeout(throw)
                                                                                         .enforce_while_debugging(enforce)
                                        });
        Ok(Self { default_timeout,
                  grace_period: grace_ms.map(Duration::from_millis).unwrap_or(DEFAULT_TIMEOUT_GRACE_PERIOD),
                  debugging })
    }

    pub fn with_default_timeout(mut self, timeout: Option<TimeoutConfig>) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    pub fn with_debugging(mut self, debugging: bool) -> Self {
        self.debugging = debugging;
        self
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, HostError>
    where F: Fn(&str) -> Option<String>,
          T: std::str::FromStr
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw.trim()
                        .parse()
                        .map(Some)
                        .map_err(|_| HostError::Config(format!("{key}: invalid value '{raw}'"))),
    }
}

fn parse_bool<F>(lookup: &F, key: &str) -> Result<Option<bool>, HostError>
    where F: Fn(&str) -> Option<String>
{
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(None),
        Some(v) if v.is_empty() => Ok(None),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(HostError::Config(format!("{key}: invalid boolean '{v}'"))),
        },
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

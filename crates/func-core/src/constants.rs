//! Constantes del núcleo de invocación.
//!
//! Valores estáticos compartidos por el pipeline y el guard de timeout.
//! `PIPELINE_VERSION` participa en el `definition_hash` de cada descriptor, de
//! modo que un cambio incompatible del algoritmo invalida los hashes previos.

use std::time::Duration;

/// Versión lógica del pipeline de invocación.
pub const PIPELINE_VERSION: &str = "P1.0";

/// Periodo de gracia que se concede al handler de excepciones tras un timeout
/// antes de dar la invocación por finalizada.
pub const DEFAULT_TIMEOUT_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Target usado por el `InvocationLogger` sobre la fachada `log`.
pub const INVOCATION_LOG_TARGET: &str = "func_core::invocation";

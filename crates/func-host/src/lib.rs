//! func-host: registro de funciones y puntos de entrada sobre el pipeline
//! de `func-core`.
//!
//! - `FunctionHost`: registro por nombre, `call`/`trigger` async y
//!   `call_blocking` para callers síncronos.
//! - `HostConfig`: timeout por defecto, gracia y modo debugging desde `.env`.
//! - `TrackingExceptionHandler`: retiene los bodies huérfanos tras un timeout.

pub mod config;
pub mod debug;
pub mod definition;
pub mod error;
pub mod handler;
pub mod host;

pub use config::{init_dotenv, HostConfig};
pub use definition::FunctionDefinition;
pub use error::HostError;
pub use handler::TrackingExceptionHandler;
pub use host::FunctionHost;

//! FuncFlow Rust Library
//!
//! Crate de aplicación sobre `func-core` y `func-host`:
//! - Expone `errors` con el error de aplicación (`AppError`).
//! - Expone `demo` con funciones que simulan triggers de cola y de blob.
//!
//! Puede usarse desde `main.rs` o por otros crates/clientes.

pub mod demo;
pub mod errors;

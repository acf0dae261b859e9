//! Filtros de invocación: hooks before/after que envuelven al body.
//!
//! - `InvocationFilter`: capacidad pura (comportamiento) de un filtro.
//! - `FilterScope` / `FilterEntry`: metadatos de colocación (instance, group,
//!   unit) separados del comportamiento.
//! - `FilterChainBuilder`: produce la secuencia ordenada para una invocación.
//! - `FnFilter`: adaptador de closures para declarar filtros sin un tipo propio.

pub mod chain;
pub mod entry;
pub mod fn_filter;
pub mod traits;

pub use chain::{FilterChain, FilterChainBuilder};
pub use entry::{FilterEntry, FilterScope};
pub use fn_filter::FnFilter;
pub use traits::InvocationFilter;

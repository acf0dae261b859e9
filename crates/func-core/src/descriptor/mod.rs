//! Descriptor de función: identidad, filtros ordenados, body y configuración
//! de timeout. Se construye una vez por definición y se reutiliza en todas las
//! invocaciones de esa función.

pub mod body;
pub mod builder;
pub mod definition;

pub use body::{FnBody, FunctionBody, InstanceParts};
pub use builder::DescriptorBuilder;
pub use definition::{FunctionDescriptor, FunctionId, TimeoutConfig};

pub mod openapi_registry;
pub mod operation_builder;
pub mod problem;

pub use openapi_registry::OpenApiDocRegistry;
pub use operation_builder::{Missing, OpenApiRegistry, OperationBuilder, OperationSpec, Present};

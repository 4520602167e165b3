pub mod builder;
pub mod config;
mod env;
pub mod error;
pub mod ir;
pub mod ops;
pub mod passes;
pub mod value;

pub use builder::BlockBuilder;
pub use config::InferenceConfig;
pub use error::{BuildError, BuildResult, InferError, InferResult};
pub use ir::{DType, Expr, Function, PrimExpr, PrimValue, ShapeExpr, StructInfo};
pub use value::Arg;

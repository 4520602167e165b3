//! IR data model: dtypes, scalar expressions, expression nodes, struct info and functions.
pub mod dtype;
pub mod expr;
pub mod function;
pub mod prim;
pub mod struct_info;
pub mod utils;

pub use dtype::{DType, DTypeKind, ParseDTypeError};
pub use expr::{Constant, Expr, Literal, PrimValue, ShapeExpr, Var, VarId};
pub use function::{Binding, Function, FunctionSerdeError, Param};
pub use prim::{PrimBinOp, PrimExpr, PrimVar};
pub use struct_info::{StructInfo, TensorShape};

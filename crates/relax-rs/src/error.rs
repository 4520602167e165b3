use thiserror::Error;

use crate::ir::dtype::DType;
use crate::ir::prim::PrimExpr;

pub type BuildResult<T> = Result<T, BuildError>;
pub type InferResult<T> = Result<T, InferError>;

/// Construction-time failures. Raised synchronously; no node is produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("{op}: argument `{param}` expects {expected}, found {found}")]
    UnsupportedArgument {
        op: &'static str,
        param: &'static str,
        expected: &'static str,
        found: String,
    },
    #[error("{op} requires an explicit dtype")]
    MissingDType { op: &'static str },
    #[error("unknown operator `{0}`")]
    UnknownOp(String),
    #[error("{op} expects {expected} operands, found {found}")]
    Arity {
        op: &'static str,
        expected: usize,
        found: usize,
    },
}

impl BuildError {
    /// Returns `true` when an argument had the wrong kind or count.
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            BuildError::UnsupportedArgument { .. } | BuildError::Arity { .. }
        )
    }
}

/// Failures reported by the struct-info inference stage.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferError {
    #[error("{op}: operand `{param}` must have shape struct info, found {found}")]
    ExpectedShape {
        op: &'static str,
        param: &'static str,
        found: String,
    },
    #[error("{op}: operand `{param}` must be a tensor, found {found}")]
    ExpectedTensor {
        op: &'static str,
        param: &'static str,
        found: String,
    },
    #[error("{op}: fill value must be a rank-0 tensor, found {found}")]
    FillValueNotScalar { op: &'static str, found: String },
    #[error("{op}: input must have {expected}, found rank {ndim}")]
    RankMismatch {
        op: &'static str,
        expected: &'static str,
        ndim: usize,
    },
    #[error("{op}: expects a floating point dtype, found integer dtype {dtype}")]
    IntegerDType { op: &'static str, dtype: DType },
    #[error("{op}: window size {window_size} must be at least 1")]
    NonPositiveWindow {
        op: &'static str,
        window_size: PrimExpr,
    },
    #[error("{op}: operand `{param}` refers to `{var}`, whose struct info is unresolved")]
    UnresolvedOperand {
        op: &'static str,
        param: &'static str,
        var: String,
    },
    #[error("variable `{0}` is not bound in this function")]
    UnboundVar(String),
}

//! Output dtype resolution for creation operators.
//!
//! The per-op default lives in one table ([`dtype_rule`]) so the behaviour can be audited
//! without reading the builders.

use serde::{Deserialize, Serialize};

use crate::error::{BuildError, BuildResult};
use crate::ir::dtype::DType;
use crate::ir::expr::PrimValue;
use crate::ops::node::OpKind;

/// How an operator picks its dtype when the caller does not supply one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DTypeRule {
    /// The caller must pass a dtype.
    Required,
    /// Read from the fill value during inference.
    FromFillValue,
    /// Read from the source tensor during inference.
    FromSource,
    /// `int` when every scalar argument is a signed integer, otherwise `float`.
    IntegerArgs { int: DType, float: DType },
    /// The operator has no dtype attribute.
    Untyped,
}

pub const fn dtype_rule(kind: OpKind) -> DTypeRule {
    match kind {
        OpKind::Ones | OpKind::Zeros | OpKind::Eye | OpKind::HammingWindow => DTypeRule::Required,
        OpKind::Full => DTypeRule::FromFillValue,
        OpKind::FullLike | OpKind::OnesLike | OpKind::ZerosLike | OpKind::EyeLike => {
            DTypeRule::FromSource
        }
        OpKind::Arange => DTypeRule::IntegerArgs {
            int: DType::Si64,
            float: DType::F32,
        },
        OpKind::Tril | OpKind::Triu => DTypeRule::Untyped,
    }
}

/// Resolves the dtype stored on a node.
///
/// `Ok(None)` means the dtype is deferred to inference. Integer-ness of `args` is read from
/// their declared dtypes, so symbolic values count even before any folding.
pub fn resolve_dtype(
    kind: OpKind,
    explicit: Option<DType>,
    args: &[&PrimValue],
) -> BuildResult<Option<DType>> {
    let rule = dtype_rule(kind);
    if let Some(dtype) = explicit {
        return Ok(match rule {
            DTypeRule::Untyped => None,
            _ => Some(dtype),
        });
    }
    match rule {
        DTypeRule::Required => Err(BuildError::MissingDType { op: kind.name() }),
        DTypeRule::FromFillValue | DTypeRule::FromSource | DTypeRule::Untyped => Ok(None),
        DTypeRule::IntegerArgs { int, float } => {
            if args.iter().all(|arg| arg.dtype().is_signed_int()) {
                Ok(Some(int))
            } else {
                Ok(Some(float))
            }
        }
    }
}

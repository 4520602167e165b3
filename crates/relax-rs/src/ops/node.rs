//! Creation operator nodes.
//!
//! Each variant carries only the operands that primitive needs. `_like` variants hold the
//! source tensor as an expression; its shape and dtype are read during inference and never
//! copied onto the node.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ir::dtype::DType;
use crate::ir::expr::{Expr, PrimValue};

/// Discriminant of [`CreationOp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpKind {
    Full,
    FullLike,
    Ones,
    OnesLike,
    Zeros,
    ZerosLike,
    Eye,
    EyeLike,
    Arange,
    HammingWindow,
    Tril,
    Triu,
}

impl OpKind {
    pub const ALL: [OpKind; 12] = [
        OpKind::Full,
        OpKind::FullLike,
        OpKind::Ones,
        OpKind::OnesLike,
        OpKind::Zeros,
        OpKind::ZerosLike,
        OpKind::Eye,
        OpKind::EyeLike,
        OpKind::Arange,
        OpKind::HammingWindow,
        OpKind::Tril,
        OpKind::Triu,
    ];

    /// Registry key of the operator.
    pub const fn name(self) -> &'static str {
        match self {
            OpKind::Full => "relax.full",
            OpKind::FullLike => "relax.full_like",
            OpKind::Ones => "relax.ones",
            OpKind::OnesLike => "relax.ones_like",
            OpKind::Zeros => "relax.zeros",
            OpKind::ZerosLike => "relax.zeros_like",
            OpKind::Eye => "relax.eye",
            OpKind::EyeLike => "relax.eye_like",
            OpKind::Arange => "relax.arange",
            OpKind::HammingWindow => "relax.hamming_window",
            OpKind::Tril => "relax.tril",
            OpKind::Triu => "relax.triu",
        }
    }

    pub fn is_like(self) -> bool {
        matches!(
            self,
            OpKind::FullLike | OpKind::OnesLike | OpKind::ZerosLike | OpKind::EyeLike
        )
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Attributes shared by every initializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InitAttrs {
    pub dtype: Option<DType>,
}

impl InitAttrs {
    pub fn new(dtype: Option<DType>) -> Self {
        Self { dtype }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CreationOp {
    Full {
        shape: Expr,
        fill_value: Expr,
        dtype: Option<DType>,
    },
    FullLike {
        x: Expr,
        fill_value: Expr,
        dtype: Option<DType>,
    },
    Ones {
        shape: Expr,
        dtype: DType,
    },
    OnesLike {
        x: Expr,
        dtype: Option<DType>,
    },
    Zeros {
        shape: Expr,
        dtype: DType,
    },
    ZerosLike {
        x: Expr,
        dtype: Option<DType>,
    },
    Eye {
        n: PrimValue,
        m: PrimValue,
        k: PrimValue,
        dtype: DType,
    },
    EyeLike {
        x: Expr,
        k: PrimValue,
        dtype: Option<DType>,
    },
    Arange {
        start: PrimValue,
        end: PrimValue,
        step: PrimValue,
        dtype: DType,
    },
    HammingWindow {
        window_size: PrimValue,
        periodic: PrimValue,
        alpha: PrimValue,
        beta: PrimValue,
        dtype: DType,
    },
    Tril {
        x: Expr,
        k: PrimValue,
    },
    Triu {
        x: Expr,
        k: PrimValue,
    },
}

impl CreationOp {
    pub fn kind(&self) -> OpKind {
        match self {
            CreationOp::Full { .. } => OpKind::Full,
            CreationOp::FullLike { .. } => OpKind::FullLike,
            CreationOp::Ones { .. } => OpKind::Ones,
            CreationOp::OnesLike { .. } => OpKind::OnesLike,
            CreationOp::Zeros { .. } => OpKind::Zeros,
            CreationOp::ZerosLike { .. } => OpKind::ZerosLike,
            CreationOp::Eye { .. } => OpKind::Eye,
            CreationOp::EyeLike { .. } => OpKind::EyeLike,
            CreationOp::Arange { .. } => OpKind::Arange,
            CreationOp::HammingWindow { .. } => OpKind::HammingWindow,
            CreationOp::Tril { .. } => OpKind::Tril,
            CreationOp::Triu { .. } => OpKind::Triu,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Operands in registry order.
    pub fn operands(&self) -> Vec<Expr> {
        let prim = |value: &PrimValue| Expr::Prim(value.clone());
        match self {
            CreationOp::Full {
                shape, fill_value, ..
            } => vec![shape.clone(), fill_value.clone()],
            CreationOp::FullLike { x, fill_value, .. } => vec![x.clone(), fill_value.clone()],
            CreationOp::Ones { shape, .. } | CreationOp::Zeros { shape, .. } => {
                vec![shape.clone()]
            }
            CreationOp::OnesLike { x, .. } | CreationOp::ZerosLike { x, .. } => vec![x.clone()],
            CreationOp::Eye { n, m, k, .. } => vec![prim(n), prim(m), prim(k)],
            CreationOp::EyeLike { x, k, .. } => vec![x.clone(), prim(k)],
            CreationOp::Arange {
                start, end, step, ..
            } => vec![prim(start), prim(end), prim(step)],
            CreationOp::HammingWindow {
                window_size,
                periodic,
                alpha,
                beta,
                ..
            } => vec![prim(window_size), prim(periodic), prim(alpha), prim(beta)],
            CreationOp::Tril { x, k } | CreationOp::Triu { x, k } => vec![x.clone(), prim(k)],
        }
    }

    /// Dtype stored on the node; `None` means it is read from an operand during inference.
    pub fn dtype(&self) -> Option<DType> {
        match self {
            CreationOp::Full { dtype, .. }
            | CreationOp::FullLike { dtype, .. }
            | CreationOp::OnesLike { dtype, .. }
            | CreationOp::ZerosLike { dtype, .. }
            | CreationOp::EyeLike { dtype, .. } => *dtype,
            CreationOp::Ones { dtype, .. }
            | CreationOp::Zeros { dtype, .. }
            | CreationOp::Eye { dtype, .. }
            | CreationOp::Arange { dtype, .. }
            | CreationOp::HammingWindow { dtype, .. } => Some(*dtype),
            CreationOp::Tril { .. } | CreationOp::Triu { .. } => None,
        }
    }

    pub fn attrs(&self) -> InitAttrs {
        InitAttrs::new(self.dtype())
    }
}

impl fmt::Display for CreationOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operands = self
            .operands()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        match self.dtype() {
            Some(dtype) => write!(f, "{}({operands}, dtype={dtype})", self.name()),
            None => write!(f, "{}({operands})", self.name()),
        }
    }
}

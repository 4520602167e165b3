//! Operator registry for the creation primitives.
//!
//! Each primitive is described by a static [`OpSchema`]. [`make_call`] rebuilds a typed
//! [`CreationOp`] from the generic `(operands, attrs)` form keyed by operator name, so
//! `make_call(op.name(), op.operands(), op.attrs())` reproduces `op`.
//!
//! [`CreationOp`]: crate::ops::node::CreationOp

use std::collections::HashMap;
use std::sync::OnceLock;

use log::debug;
use serde::Serialize;

use crate::error::{BuildError, BuildResult};
use crate::ir::expr::Expr;
use crate::ops::create::{self, required_dtype};
use crate::ops::node::{InitAttrs, OpKind};
use crate::ops::resolve::{dtype_rule, DTypeRule};
use crate::value::Arg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArgKind {
    /// A shape literal or a variable with shape struct info.
    Shape,
    Tensor,
    Prim,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArgSchema {
    pub name: &'static str,
    pub kind: ArgKind,
    pub description: &'static str,
}

/// How automatic mixed precision treats the operator's output. Creation ops either follow
/// their inputs or leave the policy unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MixedPrecisionPolicy {
    Follow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpSchema {
    pub name: &'static str,
    pub kind: OpKind,
    pub arguments: &'static [ArgSchema],
    pub dtype_rule: DTypeRule,
    pub mixed_precision: Option<MixedPrecisionPolicy>,
    pub pure: bool,
    pub summary: &'static str,
}

impl OpSchema {
    pub fn num_inputs(&self) -> usize {
        self.arguments.len()
    }
}

const fn arg(name: &'static str, kind: ArgKind, description: &'static str) -> ArgSchema {
    ArgSchema {
        name,
        kind,
        description,
    }
}

const SHAPE: ArgSchema = arg("shape", ArgKind::Shape, "The shape of the created tensor.");
const SOURCE: ArgSchema = arg(
    "x",
    ArgKind::Tensor,
    "The input tensor, which provides the shape, and dtype when the `dtype` field is not specified.",
);
const FILL_VALUE: ArgSchema = arg(
    "fill_value",
    ArgKind::Tensor,
    "The value to fill. Must be a scalar tensor.",
);
const DIAGONAL: ArgSchema = arg(
    "k",
    ArgKind::Prim,
    "Index of the diagonal: 0 is the main diagonal, positive values the upper and negative values the lower diagonals.",
);

const fn schema(
    kind: OpKind,
    arguments: &'static [ArgSchema],
    mixed_precision: Option<MixedPrecisionPolicy>,
    summary: &'static str,
) -> OpSchema {
    OpSchema {
        name: kind.name(),
        kind,
        arguments,
        dtype_rule: dtype_rule(kind),
        mixed_precision,
        pure: true,
        summary,
    }
}

const FOLLOW: Option<MixedPrecisionPolicy> = Some(MixedPrecisionPolicy::Follow);

const SHAPE_ARGS: &[ArgSchema] = &[SHAPE];
const SOURCE_ARGS: &[ArgSchema] = &[SOURCE];
const FULL_ARGS: &[ArgSchema] = &[SHAPE, FILL_VALUE];
const FULL_LIKE_ARGS: &[ArgSchema] = &[SOURCE, FILL_VALUE];
const EYE_ARGS: &[ArgSchema] = &[
    arg("n", ArgKind::Prim, "Number of rows in the output."),
    arg("m", ArgKind::Prim, "Number of columns in the output."),
    DIAGONAL,
];
const EYE_LIKE_ARGS: &[ArgSchema] = &[SOURCE, DIAGONAL];
const ARANGE_ARGS: &[ArgSchema] = &[
    arg("start", ArgKind::Prim, "The starting value for the set of points."),
    arg("end", ArgKind::Prim, "The ending value for the set of points."),
    arg("step", ArgKind::Prim, "The gap between each pair of adjacent points."),
];
const HAMMING_ARGS: &[ArgSchema] = &[
    arg("window_size", ArgKind::Prim, "The size of the window."),
    arg(
        "periodic",
        ArgKind::Prim,
        "Whether the window is periodic rather than symmetric.",
    ),
    arg("alpha", ArgKind::Prim, "The coefficient alpha."),
    arg("beta", ArgKind::Prim, "The coefficient beta."),
];
const TRIANGLE_ARGS: &[ArgSchema] = &[arg("x", ArgKind::Tensor, "The input tensor."), DIAGONAL];

static SCHEMAS: [OpSchema; 12] = [
    schema(
        OpKind::Full,
        FULL_ARGS,
        FOLLOW,
        "Fill a tensor of the given shape with a scalar value.",
    ),
    schema(
        OpKind::FullLike,
        FULL_LIKE_ARGS,
        None,
        "Fill a tensor shaped like the input with a scalar value.",
    ),
    schema(OpKind::Ones, SHAPE_ARGS, FOLLOW, "Tensor of ones with the given shape."),
    schema(OpKind::OnesLike, SOURCE_ARGS, None, "Tensor of ones shaped like the input."),
    schema(OpKind::Zeros, SHAPE_ARGS, FOLLOW, "Tensor of zeros with the given shape."),
    schema(OpKind::ZerosLike, SOURCE_ARGS, None, "Tensor of zeros shaped like the input."),
    schema(
        OpKind::Eye,
        EYE_ARGS,
        FOLLOW,
        "2-D tensor with ones on the k-th diagonal and zeros elsewhere.",
    ),
    schema(
        OpKind::EyeLike,
        EYE_LIKE_ARGS,
        None,
        "Identity-like tensor shaped like the 2-D input.",
    ),
    schema(
        OpKind::Arange,
        ARANGE_ARGS,
        FOLLOW,
        "Evenly spaced values within a half-open interval.",
    ),
    schema(
        OpKind::HammingWindow,
        HAMMING_ARGS,
        FOLLOW,
        "Hamming window of the given size.",
    ),
    schema(
        OpKind::Tril,
        TRIANGLE_ARGS,
        None,
        "Lower triangular part of a matrix or a batch of matrices.",
    ),
    schema(
        OpKind::Triu,
        TRIANGLE_ARGS,
        None,
        "Upper triangular part of a matrix or a batch of matrices.",
    ),
];

struct OpRegistry {
    by_name: HashMap<&'static str, &'static OpSchema>,
}

impl OpRegistry {
    fn new() -> Self {
        let by_name = SCHEMAS.iter().map(|schema| (schema.name, schema)).collect();
        Self { by_name }
    }
}

static GLOBAL_REGISTRY: OnceLock<OpRegistry> = OnceLock::new();

fn global_registry() -> &'static OpRegistry {
    GLOBAL_REGISTRY.get_or_init(OpRegistry::new)
}

/// Looks up an operator schema by registry name, e.g. `"relax.arange"`.
pub fn lookup_op(name: &str) -> Option<&'static OpSchema> {
    global_registry().by_name.get(name).copied()
}

/// Schema of a known operator kind.
pub fn op_schema(kind: OpKind) -> BuildResult<&'static OpSchema> {
    lookup_op(kind.name()).ok_or_else(|| BuildError::UnknownOp(kind.name().to_string()))
}

/// Registered operator names in sorted order.
pub fn list_ops() -> Vec<&'static str> {
    let mut names = global_registry().by_name.keys().copied().collect::<Vec<_>>();
    names.sort_unstable();
    names
}

fn take<const N: usize>(schema: &OpSchema, operands: Vec<Expr>) -> BuildResult<[Arg; N]> {
    let found = operands.len();
    let args = operands.into_iter().map(Arg::Expr).collect::<Vec<_>>();
    <[Arg; N]>::try_from(args).map_err(|_| BuildError::Arity {
        op: schema.name,
        expected: N,
        found,
    })
}

/// Builds a call to `name` from generic operands and attributes.
pub fn make_call(name: &str, operands: Vec<Expr>, attrs: InitAttrs) -> BuildResult<Expr> {
    let schema = lookup_op(name).ok_or_else(|| BuildError::UnknownOp(name.to_string()))?;
    debug!("make_call {} with {} operands", schema.name, operands.len());
    let dtype = attrs.dtype;
    match schema.kind {
        OpKind::Full => {
            let [shape, fill_value] = take(schema, operands)?;
            create::full(shape, fill_value, dtype)
        }
        OpKind::FullLike => {
            let [x, fill_value] = take(schema, operands)?;
            create::full_like(x, fill_value, dtype)
        }
        OpKind::Ones => {
            let [shape] = take(schema, operands)?;
            create::ones(shape, required_dtype(schema.kind, dtype)?)
        }
        OpKind::OnesLike => {
            let [x] = take(schema, operands)?;
            create::ones_like(x, dtype)
        }
        OpKind::Zeros => {
            let [shape] = take(schema, operands)?;
            create::zeros(shape, required_dtype(schema.kind, dtype)?)
        }
        OpKind::ZerosLike => {
            let [x] = take(schema, operands)?;
            create::zeros_like(x, dtype)
        }
        OpKind::Eye => {
            let [n, m, k] = take(schema, operands)?;
            create::eye(n, Some(m), k, required_dtype(schema.kind, dtype)?)
        }
        OpKind::EyeLike => {
            let [x, k] = take(schema, operands)?;
            create::eye_like(x, k, dtype)
        }
        OpKind::Arange => {
            let [start, end, step] = take(schema, operands)?;
            create::arange(start, Some(end), step, dtype)
        }
        OpKind::HammingWindow => {
            let [window_size, periodic, alpha, beta] = take(schema, operands)?;
            create::hamming_window(
                window_size,
                periodic,
                alpha,
                beta,
                required_dtype(schema.kind, dtype)?,
            )
        }
        OpKind::Tril => {
            let [x, k] = take(schema, operands)?;
            create::tril(x, k)
        }
        OpKind::Triu => {
            let [x, k] = take(schema, operands)?;
            create::triu(x, k)
        }
    }
}

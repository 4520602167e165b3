//! Tensor creation operators.
//!
//! `create` holds the builders, `node` the resulting IR variants, `resolve` the dtype rules,
//! `registry` the name-keyed operator schemas, and `infer` the struct-info rules consumed by
//! later stages.
pub mod create;
pub mod infer;
pub mod node;
pub mod registry;
pub mod resolve;

pub use create::{
    arange, eye, eye_like, full, full_like, hamming_window, ones, ones_like, tril, triu, zeros,
    zeros_like,
};
pub use node::{CreationOp, InitAttrs, OpKind};

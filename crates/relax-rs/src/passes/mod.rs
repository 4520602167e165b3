pub mod infer_struct_info;

pub use infer_struct_info::{Diagnostic, InferStructInfoPass, InferenceReport};

//! Core error values and chains.

mod chain;
mod code;
mod error;
mod result;

pub use chain::{Breadcrumb, Unwrapped, WrapChain, render_error_chain_json, wrap, wrap_foreign};
pub use code::ErrorCode;
pub use error::VelaError;
pub use result::{Result, ResultExt, VelaResultExt};

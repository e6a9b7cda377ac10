//! Constant literal rendering.
//!
//! Turns a `ConstValue` paired with its declared type into a Go expression.
//! Scalars and containers render inline; a struct constant bound to a
//! package variable renders its composite fields as follow-up statements.

mod escape;
mod renderer;


pub use escape::go_string;
pub use renderer::{ConstRenderer, Literal};

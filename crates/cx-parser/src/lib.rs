//! # cx-parser
//!
//! C/C++ header front end for cxgen, built on ast-grep's C++ grammar.
//!
//! Each header becomes an `Include` element under a `cx_core::CppModule`
//! root, holding the enums, structs, interfaces and free functions it
//! declares. Windows SDK decorations (calling-convention macros, SAL
//! annotations, `MIDL_INTERFACE`) are recognised and recorded on the model
//! rather than fed to the grammar.

pub mod annotations;
pub mod error;
mod extract;
pub mod parser;

pub use error::ParserError;
pub use parser::{HeaderParser, include_name};

//! signet-compiler
//!
//! This crate implements:
//!  1) A tokenizer + parser for the HCL-style `.signature` schema language,
//!  2) Decoding of the parsed body into typed enums, models and fields,
//!  3) Normalization of names and references,
//!  4) Two-phase verification (register every name, then resolve references),
//!  5) Code generation through a target-agnostic plan with Go and Rust backends,
//!  6) Error types (`CompileError`).

pub mod compiler;
pub mod decode;
pub mod error;
pub mod generator;
pub mod normalize;
pub mod parser;
pub mod primitive;
pub mod tokenizer;
pub mod types;
pub mod utils;
pub mod verifier;

pub use compiler::{compile_schema, parse_schema_text, read_schema, validate_schema, ValidSchema};
pub use error::CompileError;
pub use generator::{
    Backend, Formatter, GenerateOptions, Generator, GoBackend, RustBackend, Target, DEFAULT_PACKAGE,
};

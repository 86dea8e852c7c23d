//! Code generation core.
//!
//! A [`Generator`] builds a target-agnostic [`Plan`] from a validated schema,
//! hands it to a [`Backend`] for rendering and pipes the result through the
//! backend's [`Formatter`]. Backends differ only in their type mapping and
//! rendering; field order, defaults, the validator chain and the wire
//! layout all come from the plan.

mod format;
mod golang;
mod plan;
mod rust;

pub use format::Formatter;
pub use golang::GoBackend;
pub use plan::{Check, Element, EnumPlan, FieldPlan, ModelPlan, Plan};
pub use rust::RustBackend;

use crate::{compiler::ValidSchema, error::CompileError};
use lazy_static::lazy_static;
use regex::Regex;
use std::{fmt, str::FromStr};
use tracing::debug;

pub const DEFAULT_PACKAGE: &str = "types";
pub const DEFAULT_VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

lazy_static! {
    static ref PACKAGE_NAME: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("package regex is valid");
}

/// Target-language spelling of one primitive kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMapping {
    /// Native type name, e.g. `i32` or `int32`.
    pub native: &'static str,
    /// Wire-kind constant the runtime codec tags values with.
    pub kind:   &'static str,
    pub encode: &'static str,
    pub decode: &'static str,
}

pub trait Backend {
    fn name(&self) -> &'static str;

    /// Conventional file name for the generated source.
    fn file_name(&self) -> &'static str;

    /// Mapping for a primitive kind name. Unknown names map to the
    /// backend's "any" wire kind.
    fn mapping(&self, kind: &str) -> TypeMapping;

    fn formatter(&self) -> Formatter;

    fn render(&self, plan: &Plan<'_>, options: &GenerateOptions) -> Result<String, CompileError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Package (Go) or module (Rust) name of the generated code.
    pub package: String,
    /// Version tag written into the generated header.
    pub version: String,
}

impl GenerateOptions {
    /// Empty arguments fall back to [`DEFAULT_PACKAGE`] and [`DEFAULT_VERSION`].
    pub fn new(package: &str, version: &str) -> GenerateOptions {
        GenerateOptions {
            package: if package.is_empty() { DEFAULT_PACKAGE } else { package }.to_string(),
            version: if version.is_empty() { DEFAULT_VERSION } else { version }.to_string(),
        }
    }

    /// The package name, checked to be a plain identifier.
    pub fn package_name(&self) -> Result<&str, CompileError> {
        let package = if self.package.is_empty() {
            DEFAULT_PACKAGE
        } else {
            self.package.as_str()
        };
        if !PACKAGE_NAME.is_match(package) {
            return Err(CompileError::Generation(format!("invalid package name {:?}", package)));
        }
        Ok(package)
    }
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions::new("", "")
    }
}

pub struct Generator<B> {
    backend:   B,
    formatter: Formatter,
}

impl<B: Backend> Generator<B> {
    pub fn new(backend: B) -> Generator<B> {
        let formatter = backend.formatter();
        Generator { backend, formatter }
    }

    pub fn with_formatter(mut self, formatter: Formatter) -> Generator<B> {
        self.formatter = formatter;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn generate(&self, schema: &ValidSchema, options: &GenerateOptions) -> Result<String, CompileError> {
        let plan = Plan::new(schema);
        debug!(
            backend = self.backend.name(),
            enums = plan.enums.len(),
            models = plan.models.len(),
            "rendering generated source"
        );
        let source = self.backend.render(&plan, options)?;
        self.formatter.format(source)
    }

    /// Renders `schema` into source bytes for `package`, stamped with `version`.
    pub fn generate_bytes(&self, schema: &ValidSchema, package: &str, version: &str) -> Result<Vec<u8>, CompileError> {
        self.generate(schema, &GenerateOptions::new(package, version))
            .map(String::into_bytes)
    }
}

/// The built-in backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Go,
    Rust,
}

impl Target {
    pub const ALL: [Target; 2] = [Target::Go, Target::Rust];

    pub fn name(self) -> &'static str {
        match self {
            Target::Go => GoBackend.name(),
            Target::Rust => RustBackend.name(),
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Target::Go => GoBackend.file_name(),
            Target::Rust => RustBackend.file_name(),
        }
    }

    /// Generates source with this target's backend. With `format` unset the
    /// rendered source is returned as is.
    pub fn generate(self, schema: &ValidSchema, options: &GenerateOptions, format: bool) -> Result<String, CompileError> {
        match self {
            Target::Go => run(Generator::new(GoBackend), schema, options, format),
            Target::Rust => run(Generator::new(RustBackend), schema, options, format),
        }
    }
}

fn run<B: Backend>(
    generator: Generator<B>,
    schema: &ValidSchema,
    options: &GenerateOptions,
    format: bool,
) -> Result<String, CompileError> {
    let generator = if format {
        generator
    } else {
        generator.with_formatter(Formatter::None)
    };
    generator.generate(schema, options)
}

impl FromStr for Target {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Target, CompileError> {
        match s.to_ascii_lowercase().as_str() {
            "go" | "golang" => Ok(Target::Go),
            "rust" | "rs" => Ok(Target::Rust),
            other => Err(CompileError::Generation(format!("unknown target language {:?}", other))),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults() {
        let options = GenerateOptions::new("", "");
        assert_eq!(options.package, DEFAULT_PACKAGE);
        assert_eq!(options.version, DEFAULT_VERSION);
        assert_eq!(GenerateOptions::default(), options);

        let options = GenerateOptions::new("models", "v1.2.3");
        assert_eq!(options.package_name().unwrap(), "models");

        let options = GenerateOptions::new("not-a-package", "v1");
        assert!(matches!(options.package_name(), Err(CompileError::Generation(_))));
    }

    #[test]
    fn test_target_from_str() {
        assert_eq!("go".parse::<Target>().unwrap(), Target::Go);
        assert_eq!("Rust".parse::<Target>().unwrap(), Target::Rust);
        assert!("java".parse::<Target>().is_err());
        assert_eq!(Target::Rust.to_string(), "rust");
    }

    #[test]
    fn test_mapping_tables() {
        let rust = RustBackend.mapping("int32");
        assert_eq!((rust.native, rust.kind, rust.encode, rust.decode), ("i32", "Kind::I32", "encode_i32", "decode_i32"));
        let go = GoBackend.mapping("bytes");
        assert_eq!((go.native, go.kind, go.encode, go.decode), ("[]byte", "polyglot.BytesKind", "Bytes", "Bytes"));

        assert_eq!(RustBackend.mapping("Person").kind, "Kind::Any");
        assert_eq!(GoBackend.mapping("unknown").kind, "polyglot.AnyKind");
    }
}

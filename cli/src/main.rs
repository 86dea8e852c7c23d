use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use signet::{decode_to_json, schema_to_json, SchemaRef};
use signet_compiler::{read_schema, GenerateOptions, Target};

#[derive(Parser)]
#[command(name = "signet")]
#[command(about = "Validate Signet schemas and generate Go or Rust types from them", long_about = None)]
struct Cli {
    /// Log pipeline stages to stderr (overridden by SIGNET_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a schema and report `ok` or the first error
    Check {
        /// Input `.signature` schema file
        schema: PathBuf,
    },

    /// Generate source code from a schema
    Generate {
        /// Input `.signature` schema file
        schema: PathBuf,

        /// Target language: `go` or `rust`
        #[arg(short, long)]
        lang: Target,

        /// Package (Go) or module (Rust) name of the generated code
        #[arg(short, long, default_value = "")]
        package: String,

        /// Version tag written into the generated header
        #[arg(long, default_value = "")]
        version_tag: String,

        /// Output file (if omitted, prints to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip running the target's formatter
        #[arg(long)]
        no_format: bool,
    },

    /// Print the normalized, validated schema as JSON
    Inspect {
        /// Input `.signature` schema file
        schema: PathBuf,
    },

    /// Decode an encoded payload to JSON (printed to stdout)
    Decode {
        /// Input payload file
        input: PathBuf,
    },

    /// Split an `organization/name@tag` schema reference into its parts
    Ref {
        /// Schema reference, e.g. `acme/orders@1.2.0`
        reference: String,
    },
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("SIGNET_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli.command)
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Check { schema } => {
            load(&schema)?;
            println!("ok");
            Ok(())
        }

        Commands::Generate {
            schema,
            lang,
            package,
            version_tag,
            output,
            no_format,
        } => {
            let valid = load(&schema)?;
            let options = GenerateOptions::new(&package, &version_tag);
            debug!(target_lang = %lang, package = %options.package, "generating");
            let source = lang
                .generate(&valid, &options, !no_format)
                .with_context(|| format!("failed to generate {} code for {}", lang, schema.display()))?;
            match output {
                Some(path) => {
                    fs::write(&path, &source).with_context(|| format!("failed to write {}", path.display()))?;
                    info!(path = %path.display(), "wrote generated source");
                }
                None => print!("{}", source),
            }
            Ok(())
        }

        Commands::Inspect { schema } => {
            let valid = load(&schema)?;
            println!("{}", schema_to_json(&valid)?);
            Ok(())
        }

        Commands::Decode { input } => {
            let data = fs::read(&input).with_context(|| format!("failed to read {}", input.display()))?;
            println!("{}", decode_to_json(&data)?);
            Ok(())
        }

        Commands::Ref { reference } => {
            println!("{:#}", SchemaRef::parse(&reference).to_json());
            Ok(())
        }
    }
}

fn load(path: &Path) -> Result<signet_compiler::ValidSchema> {
    read_schema(path).with_context(|| format!("invalid schema {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SCHEMA: &str = r#"
        version = "v1alpha"
        name = "Demo"
        tag = "1.0"
        model Point {
            int32 X { }
        }
    "#;

    #[test]
    fn test_generate_writes_output_file() {
        let dir = tempdir().unwrap();
        let schema = dir.path().join("demo.signature");
        let output = dir.path().join("generated.rs");
        fs::write(&schema, SCHEMA).unwrap();

        let cli = Cli::try_parse_from([
            "signet",
            "generate",
            schema.to_str().unwrap(),
            "--lang",
            "rust",
            "--package",
            "demo",
            "--version-tag",
            "v1.0.0",
            "-o",
            output.to_str().unwrap(),
            "--no-format",
        ])
        .unwrap();
        run(cli.command).unwrap();

        let source = fs::read_to_string(&output).unwrap();
        assert!(source.starts_with("// Code generated by signet v1.0.0"));
        assert!(source.contains("pub mod demo {"));
    }

    #[test]
    fn test_check_reports_invalid_schema() {
        let dir = tempdir().unwrap();
        let schema = dir.path().join("bad.signature");
        fs::write(&schema, "version = \"v1alpha\"\nname = \"N\"\ntag = \"T\"\nmodel M { model A { reference = \"Missing\" } }").unwrap();

        let cli = Cli::try_parse_from(["signet", "check", schema.to_str().unwrap()]).unwrap();
        let err = run(cli.command).unwrap_err();
        assert!(format!("{:#}", err).contains("unknown M.A.reference: Missing"));
    }

    #[test]
    fn test_ref_command_parses() {
        let cli = Cli::try_parse_from(["signet", "ref", "acme/orders@1.2.0"]).unwrap();
        match &cli.command {
            Commands::Ref { reference } => assert_eq!(SchemaRef::parse(reference).tag, "1.2.0"),
            _ => panic!("expected the ref command"),
        }
        run(cli.command).unwrap();
    }

    #[test]
    fn test_unknown_language_is_rejected() {
        assert!(Cli::try_parse_from(["signet", "generate", "x.signature", "--lang", "java"]).is_err());
    }
}

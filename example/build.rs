use std::{env, error::Error, fs, path::PathBuf};

use signet_compiler::{read_schema, GenerateOptions, Target};

const SCHEMA: &str = "schema/master.signature";

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed={}", SCHEMA);

    let schema = read_schema(SCHEMA)?;
    let options = GenerateOptions::new("master", "");
    let source = Target::Rust.generate(&schema, &options, false)?;

    let out = PathBuf::from(env::var("OUT_DIR")?).join("generated.rs");
    fs::write(out, source)?;
    Ok(())
}

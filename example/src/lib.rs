//! Types generated from `schema/master.signature` by the build script.

include!(concat!(env!("OUT_DIR"), "/generated.rs"));

pub use master::*;

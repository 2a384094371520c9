/// SDNA inspection command.
pub mod dna;
/// Materialized structure dump command.
pub mod dump;
/// File-level information command.
pub mod info;
/// Raw-block diagnostics command.
pub mod raw;
/// Shared argument parsers and renderers.
pub(crate) mod util;

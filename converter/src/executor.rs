use std::io::{Read, Write};

use log::debug;
use nsc::Job;
use nsc::digits::StoreConfig;
use nsc::parser::{DEFAULT_CHUNK_SIZE, Parser};
use serde::Deserialize;

use crate::error::ConvertError;
use crate::power;
use crate::printer;
use crate::universal;

/// Which converter handles a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Power path when the bases are power-related, universal path otherwise.
    #[default]
    Auto,
    /// Always use the universal path.
    Universal,
}

/// Pipeline settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Options {
    #[serde(flatten)]
    pub store: StoreConfig,
    /// Bytes requested per read.
    pub chunk_size: usize,
    pub strategy: Strategy,
    /// Read and discard input left after the base pair.
    pub drain_trailing: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            store: StoreConfig::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            strategy: Strategy::Auto,
            drain_trailing: true,
        }
    }
}

/// Convert a parsed job into its output base.
pub fn convert(job: Job, strategy: Strategy) -> Result<Job, ConvertError> {
    let relation = match strategy {
        Strategy::Auto => power::power_relation(job.base_in, job.base_out),
        Strategy::Universal => None,
    };
    let converted = match relation {
        Some(relation) => power::convert(job, relation)?,
        None => universal::convert(job)?,
    };
    Ok(converted)
}

/// Parse a request from `reader`, convert it, and print the result to `writer`.
///
/// Nothing is written unless parsing and conversion both succeed.
pub fn execute<R: Read, W: Write>(
    reader: R,
    writer: W,
    options: &Options,
) -> Result<W, ConvertError> {
    let job = Parser::new(reader)
        .with_chunk_size(options.chunk_size)
        .with_store_config(options.store)
        .drain_trailing(options.drain_trailing)
        .parse()?;
    let job = convert(job, options.strategy)?;
    debug!(
        "printing {} digits in base {} ({} blocks)",
        job.digits.len(),
        job.base_out,
        job.digits.live_blocks()
    );
    printer::print(job, writer).map_err(ConvertError::Write)
}

/// Run the pipeline over an in-memory request and return the printed line.
pub fn convert_str(input: &str, options: &Options) -> Result<String, ConvertError> {
    let output = execute(input.as_bytes(), Vec::new(), options)?;
    Ok(String::from_utf8_lossy(&output).into_owned())
}

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use digo_core::parser::ParseError;
use rustyline::error::ReadlineError;
use thiserror::Error;

use crate::printer::{self, ParseReport};
use crate::session::{Outcome, Session};

pub const FILE_EXTENSION: &str = "digo";

#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid file {}. File must be of type .digo", .0.display())]
    InvalidExtension(PathBuf),
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}", ParseReport(.0.as_slice()))]
    Parse(Vec<ParseError>),
    #[error("could not write output: {0}")]
    Output(#[source] io::Error),
    #[error("could not start the line editor: {0}")]
    Editor(#[from] ReadlineError),
}

pub fn check_extension(path: &Path) -> Result<(), RunError> {
    match path.extension().and_then(|extension| extension.to_str()) {
        Some(FILE_EXTENSION) => Ok(()),
        _ => Err(RunError::InvalidExtension(path.to_owned())),
    }
}

pub fn run_file(path: &Path) -> Result<(), RunError> {
    check_extension(path)?;
    tracing::info!(path = %path.display(), "reading program");
    let source = fs::read_to_string(path).map_err(|source| RunError::Io {
        path: path.to_owned(),
        source,
    })?;

    run_source(&source, &mut io::stdout().lock())
}

/// Runs a whole program and prints its final value or runtime error.
///
/// A program that fails to parse is never evaluated.
pub fn run_source(source: &str, out: &mut impl Write) -> Result<(), RunError> {
    match Session::new().execute(source) {
        Outcome::ParseErrors(errors) => Err(RunError::Parse(errors)),
        outcome => printer::write_outcome(out, &outcome).map_err(RunError::Output),
    }
}

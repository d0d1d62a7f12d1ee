use std::fmt::Display;
use std::io::{self, Write};

use digo_core::parser::ParseError;

use crate::session::Outcome;

/// The report printed when a program does not parse.
pub struct ParseReport<'a>(pub &'a [ParseError]);

impl Display for ParseReport<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Woops! error executing program.\n parser errors:")?;
        for error in self.0 {
            write!(f, "\n\t{}", error)?;
        }
        Ok(())
    }
}

pub fn write_outcome(out: &mut impl Write, outcome: &Outcome) -> io::Result<()> {
    match outcome {
        Outcome::ParseErrors(errors) => writeln!(out, "{}", ParseReport(errors)),
        Outcome::Value(value) => writeln!(out, "{}", value),
        Outcome::Error(error) => writeln!(out, "{}", error),
    }
}

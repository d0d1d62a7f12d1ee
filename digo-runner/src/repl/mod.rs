mod reader;

use std::io::{self, Write};

use reader::{ReadOutput, Reader};

use crate::printer;
use crate::runner::RunError;
use crate::session::Session;

const FAREWELL: &str = "Goodbye =]";

/// Reads lines until end of input, evaluating each one in a shared session.
struct Repl {
    reader: Reader,
    session: Session,
}

impl Repl {
    fn run(mut self, out: &mut impl Write) -> Result<(), RunError> {
        loop {
            match self.reader.read() {
                ReadOutput::Exit => break,
                ReadOutput::Clear => continue,
                ReadOutput::Line(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let outcome = self.session.execute(&line);
                    printer::write_outcome(out, &outcome).map_err(RunError::Output)?;
                }
            }
        }
        writeln!(out, "{}", FAREWELL).map_err(RunError::Output)
    }
}

pub fn start() -> Result<(), RunError> {
    let reader = Reader::new()?;
    tracing::info!("starting repl");
    println!("Hello! This is the digo programming language.");

    Repl {
        reader,
        session: Session::new(),
    }
    .run(&mut io::stdout())
}

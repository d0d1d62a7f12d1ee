use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

const PROMPT: &str = ">> ";

pub enum ReadOutput {
    Exit,
    Clear,
    Line(String),
}

pub struct Reader {
    rl: DefaultEditor,
}

impl Reader {
    pub fn new() -> Result<Self, ReadlineError> {
        Ok(Self {
            rl: DefaultEditor::new()?,
        })
    }

    pub fn read(&mut self) -> ReadOutput {
        match self.rl.readline(PROMPT) {
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                ReadOutput::Clear
            }
            Err(ReadlineError::Eof) => ReadOutput::Exit,
            Err(err) => {
                tracing::error!(error = %err, "could not read line");
                ReadOutput::Exit
            }
            Ok(line) => {
                if let Err(err) = self.rl.add_history_entry(line.as_str()) {
                    tracing::warn!(error = %err, "could not record history");
                }
                ReadOutput::Line(line)
            }
        }
    }
}

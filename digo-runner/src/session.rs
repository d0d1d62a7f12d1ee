use digo_core::lexer::Tokenizer;
use digo_core::parser::{ParseError, Parser};
use digo_interpreter::environment::Environment;
use digo_interpreter::evaluator::Evaluator;
use digo_interpreter::object::{EvaluationError, Object};
use gc::Gc;

/// What running one piece of source produced.
#[derive(Debug)]
pub enum Outcome {
    ParseErrors(Vec<ParseError>),
    Value(Gc<Object>),
    Error(EvaluationError),
}

/// Runs sources one after another against a single root environment, so
/// bindings made by earlier sources stay visible to later ones.
pub struct Session {
    evaluator: Evaluator,
    environment: Environment,
}

impl Session {
    pub fn new() -> Self {
        Self {
            evaluator: Evaluator::new(),
            environment: Environment::new(),
        }
    }

    pub fn execute(&mut self, source: &str) -> Outcome {
        tracing::debug!(bytes = source.len(), "parsing");
        let program = match Parser::new(Tokenizer::new(source)).parse_program() {
            Ok(program) => program,
            Err(errors) => {
                tracing::debug!(count = errors.len(), "skipping evaluation");
                return Outcome::ParseErrors(errors);
            }
        };

        tracing::debug!(statements = program.statements.len(), "evaluating");
        match self.evaluator.eval_program(&program, &mut self.environment) {
            Ok(value) => Outcome::Value(value),
            Err(error) => Outcome::Error(error),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{Outcome, Session};

    fn rendered(outcome: Outcome) -> String {
        match outcome {
            Outcome::Value(value) => value.to_string(),
            Outcome::Error(error) => format!("error: {}", error),
            Outcome::ParseErrors(errors) => format!("{} parse errors", errors.len()),
        }
    }

    #[test]
    fn test_bindings_persist_between_sources() {
        let mut session = Session::new();

        assert_eq!(rendered(session.execute("let a = [1, 2];")), "[1, 2]");
        assert_eq!(rendered(session.execute("let b = a.push(3);")), "[1, 2, 3]");
        assert_eq!(rendered(session.execute("len(b)")), "3");
    }

    #[test]
    fn test_parse_errors_skip_evaluation() {
        let mut session = Session::new();

        let outcome = session.execute("let x = 1; let = 2;");
        assert_eq!(rendered(outcome), "1 parse errors");
        assert_eq!(
            rendered(session.execute("x")),
            "error: identifier not found: x"
        );
    }

    #[test]
    fn test_runtime_errors_keep_the_session() {
        let mut session = Session::new();

        assert_eq!(
            rendered(session.execute("let y = 2; y + true")),
            "error: type mismatch: INTEGER + BOOLEAN"
        );
        assert_eq!(rendered(session.execute("y")), "2");
    }
}

use std::collections::HashMap;
use std::io::{self, Write};

use gc::Gc;

use crate::object::{BuiltinFunction, BuiltinResult, EvaluationError, Object};

/// Builtins that may be reached through `receiver.member`.
pub const SELECTOR_MEMBERS: [&str; 5] = ["len", "rest", "push", "last", "first"];

/// The table of native functions visible to every program.
///
/// Built once and never mutated afterwards; the evaluator owns it.
#[derive(Debug, Clone)]
pub struct Builtins {
    functions: HashMap<&'static str, BuiltinFunction>,
}

impl Builtins {
    pub fn standard() -> Self {
        Self::from_functions([
            BuiltinFunction {
                name: "len",
                func: builtin_len,
            },
            BuiltinFunction {
                name: "isNull",
                func: builtin_is_null,
            },
            BuiltinFunction {
                name: "first",
                func: builtin_first,
            },
            BuiltinFunction {
                name: "last",
                func: builtin_last,
            },
            BuiltinFunction {
                name: "rest",
                func: builtin_rest,
            },
            BuiltinFunction {
                name: "push",
                func: builtin_push,
            },
            BuiltinFunction {
                name: "println",
                func: builtin_println,
            },
        ])
    }

    pub fn from_functions(functions: impl IntoIterator<Item = BuiltinFunction>) -> Self {
        Builtins {
            functions: functions
                .into_iter()
                .map(|function| (function.name, function))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<BuiltinFunction> {
        self.functions.get(name).copied()
    }

    /// Looks up a builtin that is allowed as a selector member.
    pub fn selector(&self, member: &str) -> Option<BuiltinFunction> {
        if SELECTOR_MEMBERS.contains(&member) {
            self.get(member)
        } else {
            None
        }
    }
}

impl Default for Builtins {
    fn default() -> Self {
        Self::standard()
    }
}

fn check_arity(args: &[Gc<Object>], want: usize) -> Result<(), EvaluationError> {
    if args.len() != want {
        return Err(EvaluationError::WrongArgumentCount {
            got: args.len(),
            want,
        });
    }
    Ok(())
}

fn expect_array<'a>(
    function: &'static str,
    arg: &'a Gc<Object>,
) -> Result<&'a [Gc<Object>], EvaluationError> {
    match &**arg {
        Object::Array(arr) => Ok(arr.as_slice()),
        other => Err(EvaluationError::ExpectedArray {
            function,
            got: other.object_type(),
        }),
    }
}

fn builtin_len(args: Vec<Gc<Object>>) -> BuiltinResult {
    check_arity(&args, 1)?;
    match &*args[0] {
        Object::String(s) => Ok(Object::integer(s.len() as i64)),
        Object::Array(arr) => Ok(Object::integer(arr.len() as i64)),
        other => Err(EvaluationError::UnsupportedArgument {
            function: "len",
            got: other.object_type(),
        }),
    }
}

fn builtin_is_null(args: Vec<Gc<Object>>) -> BuiltinResult {
    check_arity(&args, 1)?;
    Ok(Object::boolean(matches!(&*args[0], Object::Null)))
}

fn builtin_first(args: Vec<Gc<Object>>) -> BuiltinResult {
    check_arity(&args, 1)?;
    let arr = expect_array("first", &args[0])?;
    Ok(arr.first().cloned().unwrap_or_else(Object::null))
}

fn builtin_last(args: Vec<Gc<Object>>) -> BuiltinResult {
    check_arity(&args, 1)?;
    let arr = expect_array("last", &args[0])?;
    Ok(arr.last().cloned().unwrap_or_else(Object::null))
}

fn builtin_rest(args: Vec<Gc<Object>>) -> BuiltinResult {
    check_arity(&args, 1)?;
    let arr = expect_array("rest", &args[0])?;
    if arr.is_empty() {
        return Ok(Object::null());
    }
    Ok(Object::array(arr[1..].to_vec()))
}

fn builtin_push(args: Vec<Gc<Object>>) -> BuiltinResult {
    check_arity(&args, 2)?;
    let arr = expect_array("push", &args[0])?;
    let mut new_arr = arr.to_vec();
    new_arr.push(args[1].clone());
    Ok(Object::array(new_arr))
}

fn builtin_println(args: Vec<Gc<Object>>) -> BuiltinResult {
    write_line(&mut io::stdout().lock(), &args)
}

/// Writes the arguments separated by spaces, then a newline.
fn write_line(out: &mut impl Write, args: &[Gc<Object>]) -> BuiltinResult {
    let line = args
        .iter()
        .map(|arg| arg.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(out, "{}", line).map_err(|err| EvaluationError::Output(err.to_string().into()))?;
    Ok(Object::null())
}

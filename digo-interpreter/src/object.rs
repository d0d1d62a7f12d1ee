use std::fmt::Display;
use std::rc::Rc;

use digo_core::ast;
use gc::{Finalize, Gc, Trace};
use thiserror::Error;

use crate::environment::Environment;

#[derive(Debug, PartialEq, Trace, Finalize)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    String(String),
    Array(Vec<Gc<Object>>),
    Function(Function),
    BuiltinFunction(BuiltinFunction),
    Null,
}

thread_local! {
    static NULL: Gc<Object> = Gc::new(Object::Null);
    static TRUE: Gc<Object> = Gc::new(Object::Boolean(true));
    static FALSE: Gc<Object> = Gc::new(Object::Boolean(false));
}

impl Object {
    pub fn null() -> Gc<Object> {
        NULL.with(|x| x.clone())
    }
    pub fn boolean(value: bool) -> Gc<Object> {
        if value {
            TRUE.with(|x| x.clone())
        } else {
            FALSE.with(|x| x.clone())
        }
    }
    pub fn integer(value: i64) -> Gc<Object> {
        Gc::new(Object::Integer(value))
    }
    pub fn string(value: String) -> Gc<Object> {
        Gc::new(Object::String(value))
    }
    pub fn array(array: Vec<Gc<Object>>) -> Gc<Object> {
        Gc::new(Object::Array(array))
    }
    pub fn function(
        parameters: Rc<[ast::Identifier]>,
        body: Rc<ast::BlockStatement>,
        environment: Environment,
    ) -> Gc<Object> {
        Gc::new(Object::Function(Function {
            parameters,
            body,
            environment,
        }))
    }
    pub fn builtin_function(func: BuiltinFunction) -> Gc<Object> {
        Gc::new(Object::BuiltinFunction(func))
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            Object::Integer(_) => ObjectType::Integer,
            Object::Boolean(_) => ObjectType::Boolean,
            Object::String(_) => ObjectType::String,
            Object::Array(_) => ObjectType::Array,
            Object::Function(_) => ObjectType::Function,
            Object::BuiltinFunction(_) => ObjectType::Builtin,
            Object::Null => ObjectType::Null,
        }
    }
}

/// Renders a value the way the REPL prints it.
impl Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Object::Integer(value) => write!(f, "{}", value),
            Object::Boolean(value) => write!(f, "{}", value),
            Object::String(value) => write!(f, "{}", value),
            Object::Null => write!(f, "null"),
            Object::Array(array) => {
                write!(f, "[")?;
                for (i, object) in array.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", object)?;
                }
                write!(f, "]")
            }
            Object::Function(function) => {
                write!(
                    f,
                    "fn({}) {}",
                    function
                        .parameters
                        .iter()
                        .map(|id| id.name.as_ref())
                        .collect::<Box<[&str]>>()
                        .join(", "),
                    function.body
                )
            }
            Object::BuiltinFunction(_) => write!(f, "builtin function"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ObjectType {
    Integer,
    Boolean,
    String,
    Null,
    Array,
    Function,
    Builtin,
}

impl Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ObjectType::Integer => "INTEGER",
            ObjectType::Boolean => "BOOLEAN",
            ObjectType::String => "STRING",
            ObjectType::Null => "NULL",
            ObjectType::Array => "ARRAY",
            ObjectType::Function => "FUNCTION",
            ObjectType::Builtin => "BUILTIN",
        };
        f.write_str(name)
    }
}

/// A user-defined function together with the environment it was defined in.
#[derive(Clone, Trace, Finalize)]
pub struct Function {
    #[unsafe_ignore_trace]
    pub parameters: Rc<[ast::Identifier]>,
    #[unsafe_ignore_trace]
    pub body: Rc<ast::BlockStatement>,
    pub environment: Environment,
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.body, &other.body) && self.environment.ptr_eq(&other.environment)
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field(
                "parameters",
                &self
                    .parameters
                    .iter()
                    .map(|id| id.name.as_ref())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

pub type BuiltinResult = Result<Gc<Object>, EvaluationError>;

#[derive(Clone, Copy)]
pub struct BuiltinFunction {
    pub name: &'static str,
    pub func: fn(Vec<Gc<Object>>) -> BuiltinResult,
}

impl Finalize for BuiltinFunction {}

// Holds no garbage-collected pointers.
unsafe impl Trace for BuiltinFunction {
    gc::unsafe_empty_trace!();
}

impl PartialEq for BuiltinFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl std::fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinFunction")
            .field("name", &self.name)
            .finish()
    }
}

/// Control flow that cuts evaluation of the enclosing blocks short.
#[derive(Debug, PartialEq)]
pub enum QuickReturn {
    Return(Gc<Object>),
    Error(EvaluationError),
}

impl From<EvaluationError> for QuickReturn {
    fn from(value: EvaluationError) -> Self {
        QuickReturn::Error(value)
    }
}

#[derive(Debug, PartialEq, Clone, Error)]
pub enum EvaluationError {
    #[error("identifier not found: {0}")]
    UnknownIdentifier(Rc<str>),
    #[error("unknown operator: {operation}{right}")]
    UnknownPrefixOperator {
        operation: ast::PrefixOperationKind,
        right: ObjectType,
    },
    #[error("type mismatch: {left} {operation} {right}")]
    TypeMismatch {
        left: ObjectType,
        operation: ast::InfixOperationKind,
        right: ObjectType,
    },
    #[error("unknown operator: {left} {operation} {right}")]
    UnknownInfixOperator {
        left: ObjectType,
        operation: ast::InfixOperationKind,
        right: ObjectType,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("unknown operator: if({0})")]
    NonBooleanCondition(ObjectType),
    #[error("not a function: {0}")]
    CallNonFunction(ObjectType),
    #[error("wrong number of arguments. got={got}, want={want}")]
    WrongArgumentCount { got: usize, want: usize },
    #[error("argument to `{function}` not supported, got {got}")]
    UnsupportedArgument {
        function: &'static str,
        got: ObjectType,
    },
    #[error("argument to `{function}` must be ARRAY, got {got}")]
    ExpectedArray {
        function: &'static str,
        got: ObjectType,
    },
    #[error("unknown operator: {left}[{index}]")]
    IndexNotSupported { left: ObjectType, index: ObjectType },
    #[error("unknown operator: {receiver}.{member}")]
    SelectorNotSupported { receiver: ObjectType, member: Rc<str> },
    #[error("invalid selector: {0}")]
    InvalidSelector(Rc<str>),
    #[error("could not write output: {0}")]
    Output(Rc<str>),
}

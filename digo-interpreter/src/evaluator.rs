use digo_core::ast;
use digo_core::ast::Expression;
use gc::Gc;

use crate::builtins::Builtins;
use crate::environment::Environment;
use crate::object::{BuiltinFunction, EvaluationError, Function, Object, QuickReturn};

type EvalResult = Result<Gc<Object>, QuickReturn>;

/// Walks a program and computes its value.
///
/// The evaluator holds no state besides the builtin table, so one instance can
/// run any number of programs against any number of environments.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    builtins: Builtins,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_builtins(Builtins::standard())
    }

    pub fn with_builtins(builtins: Builtins) -> Self {
        Evaluator { builtins }
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    pub fn eval_program(
        &self,
        program: &ast::Program,
        environment: &mut Environment,
    ) -> Result<Gc<Object>, EvaluationError> {
        let mut output = Object::null();
        for statement in &program.statements {
            match self.eval_statement(statement, environment) {
                Err(QuickReturn::Return(value)) => return Ok(value),
                Err(QuickReturn::Error(error)) => return Err(error),
                Ok(object) => output = object,
            };
        }
        Ok(output)
    }

    fn eval_statement(
        &self,
        statement: &ast::Statement,
        environment: &mut Environment,
    ) -> EvalResult {
        match statement {
            ast::Statement::Expression(expression) => {
                self.eval_expression(expression, environment)
            }
            ast::Statement::Return(statement) => {
                let value = self.eval_expression(&statement.value, environment)?;
                Err(QuickReturn::Return(value))
            }
            ast::Statement::Let(statement) => self.eval_let_statement(statement, environment),
            ast::Statement::Block(block) => self.eval_block_statement(block, environment),
        }
    }

    fn eval_let_statement(
        &self,
        statement: &ast::LetStatement,
        environment: &mut Environment,
    ) -> EvalResult {
        let value = match &statement.value {
            Some(expression) => self.eval_expression(expression, environment)?,
            None => Object::null(),
        };
        environment.set(&statement.identifier.name, value.clone());
        Ok(value)
    }

    // Blocks share the environment they appear in; only calls open a scope.
    fn eval_block_statement(
        &self,
        block: &ast::BlockStatement,
        environment: &mut Environment,
    ) -> EvalResult {
        let mut result = Object::null();
        for statement in &block.statements {
            result = self.eval_statement(statement, environment)?;
        }
        Ok(result)
    }

    fn eval_expression(
        &self,
        expression: &Expression,
        environment: &mut Environment,
    ) -> EvalResult {
        match expression {
            Expression::IntegerLiteral(value) => Ok(Object::integer(*value)),
            Expression::BooleanLiteral(value) => Ok(Object::boolean(*value)),
            Expression::StringLiteral(value) => Ok(Object::string(value.clone())),
            Expression::ArrayLiteral(elements) => {
                Ok(Object::array(self.eval_expressions(elements, environment)?))
            }
            Expression::Identifier(identifier) => self.eval_identifier(identifier, environment),
            Expression::PrefixOperation(kind, right) => {
                let right = self.eval_expression(right, environment)?;
                Ok(eval_prefix_operation(*kind, right)?)
            }
            Expression::InfixOperation(kind, left, right) => {
                // Right operand first: its error wins when both sides fail.
                let right = self.eval_expression(right, environment)?;
                let left = self.eval_expression(left, environment)?;
                Ok(eval_infix_operation(*kind, left, right)?)
            }
            Expression::IfExpression {
                condition,
                consequence,
                alternative,
            } => {
                let condition = self.eval_expression(condition, environment)?;
                let take_consequence = match &*condition {
                    Object::Boolean(value) => *value,
                    Object::Null => false,
                    other => {
                        return Err(
                            EvaluationError::NonBooleanCondition(other.object_type()).into()
                        )
                    }
                };
                if take_consequence {
                    self.eval_block_statement(consequence, environment)
                } else if let Some(alternative) = alternative {
                    self.eval_block_statement(alternative, environment)
                } else {
                    Ok(Object::null())
                }
            }
            Expression::FunctionLiteral { parameters, body } => Ok(Object::function(
                parameters.clone(),
                body.clone(),
                environment.clone(),
            )),
            Expression::CallExpression {
                function,
                arguments,
            } => {
                if let Expression::SelectorExpression { receiver, member } = function.as_ref() {
                    return self.eval_method_call(receiver, member, arguments, environment);
                }
                let function = self.eval_expression(function, environment)?;
                let arguments = self.eval_expressions(arguments, environment)?;
                self.apply(&function, arguments)
            }
            Expression::IndexExpression { left, index } => {
                let left = self.eval_expression(left, environment)?;
                let index = self.eval_expression(index, environment)?;
                Ok(eval_index_expression(&left, &index)?)
            }
            Expression::SelectorExpression { receiver, member } => {
                let receiver = self.eval_expression(receiver, environment)?;
                let builtin = self.resolve_selector(&receiver, member)?;
                call_builtin(builtin, vec![receiver])
            }
        }
    }

    fn eval_identifier(
        &self,
        identifier: &ast::Identifier,
        environment: &Environment,
    ) -> EvalResult {
        if let Some(builtin) = self.builtins.get(&identifier.name) {
            return Ok(Object::builtin_function(builtin));
        }
        environment
            .get(&identifier.name)
            .ok_or_else(|| EvaluationError::UnknownIdentifier(identifier.name.clone()).into())
    }

    /// Evaluates left to right, stopping at the first failure.
    fn eval_expressions(
        &self,
        expressions: &[Expression],
        environment: &mut Environment,
    ) -> Result<Vec<Gc<Object>>, QuickReturn> {
        let mut result = Vec::with_capacity(expressions.len());
        for expression in expressions {
            result.push(self.eval_expression(expression, environment)?);
        }
        Ok(result)
    }

    /// `receiver.member(args)` calls the selected builtin with the receiver
    /// as its first argument.
    fn eval_method_call(
        &self,
        receiver: &Expression,
        member: &ast::Identifier,
        arguments: &[Expression],
        environment: &mut Environment,
    ) -> EvalResult {
        let receiver = self.eval_expression(receiver, environment)?;
        let builtin = self.resolve_selector(&receiver, member)?;
        let mut all_arguments = vec![receiver];
        all_arguments.extend(self.eval_expressions(arguments, environment)?);
        call_builtin(builtin, all_arguments)
    }

    fn resolve_selector(
        &self,
        receiver: &Gc<Object>,
        member: &ast::Identifier,
    ) -> Result<BuiltinFunction, EvaluationError> {
        if !matches!(&**receiver, Object::Array(_)) {
            return Err(EvaluationError::SelectorNotSupported {
                receiver: receiver.object_type(),
                member: member.name.clone(),
            });
        }
        self.builtins
            .selector(&member.name)
            .ok_or_else(|| EvaluationError::InvalidSelector(member.name.clone()))
    }

    fn apply(&self, function: &Gc<Object>, arguments: Vec<Gc<Object>>) -> EvalResult {
        match &**function {
            Object::Function(function) => self.apply_function(function, arguments),
            Object::BuiltinFunction(builtin) => call_builtin(*builtin, arguments),
            other => Err(EvaluationError::CallNonFunction(other.object_type()).into()),
        }
    }

    fn apply_function(&self, function: &Function, arguments: Vec<Gc<Object>>) -> EvalResult {
        if function.parameters.len() != arguments.len() {
            return Err(EvaluationError::WrongArgumentCount {
                got: arguments.len(),
                want: function.parameters.len(),
            }
            .into());
        }
        tracing::trace!(arguments = arguments.len(), "calling function");

        let mut call_environment = Environment::new_enclosed(function.environment.clone());
        for (parameter, argument) in function.parameters.iter().zip(arguments) {
            call_environment.set(&parameter.name, argument);
        }
        match self.eval_block_statement(&function.body, &mut call_environment) {
            Ok(object) => Ok(object),
            Err(QuickReturn::Return(value)) => Ok(value),
            Err(error) => Err(error),
        }
    }
}

fn call_builtin(builtin: BuiltinFunction, arguments: Vec<Gc<Object>>) -> EvalResult {
    tracing::trace!(builtin = builtin.name, arguments = arguments.len(), "calling builtin");
    Ok((builtin.func)(arguments)?)
}

fn eval_prefix_operation(
    kind: ast::PrefixOperationKind,
    right: Gc<Object>,
) -> Result<Gc<Object>, EvaluationError> {
    match (kind, &*right) {
        (ast::PrefixOperationKind::Bang, Object::Boolean(value)) => Ok(Object::boolean(!value)),
        (ast::PrefixOperationKind::Minus, Object::Integer(value)) => {
            Ok(Object::integer(value.wrapping_neg()))
        }
        _ => Err(EvaluationError::UnknownPrefixOperator {
            operation: kind,
            right: right.object_type(),
        }),
    }
}

fn eval_infix_operation(
    kind: ast::InfixOperationKind,
    left: Gc<Object>,
    right: Gc<Object>,
) -> Result<Gc<Object>, EvaluationError> {
    use ast::InfixOperationKind;

    if left.object_type() != right.object_type() {
        return Err(EvaluationError::TypeMismatch {
            left: left.object_type(),
            operation: kind,
            right: right.object_type(),
        });
    }
    match (kind, &*left, &*right) {
        (InfixOperationKind::Plus, Object::Integer(left), Object::Integer(right)) => {
            Ok(Object::integer(left.wrapping_add(*right)))
        }
        (InfixOperationKind::Minus, Object::Integer(left), Object::Integer(right)) => {
            Ok(Object::integer(left.wrapping_sub(*right)))
        }
        (InfixOperationKind::Multiply, Object::Integer(left), Object::Integer(right)) => {
            Ok(Object::integer(left.wrapping_mul(*right)))
        }
        (InfixOperationKind::Divide, Object::Integer(_), Object::Integer(0)) => {
            Err(EvaluationError::DivisionByZero)
        }
        (InfixOperationKind::Divide, Object::Integer(left), Object::Integer(right)) => {
            Ok(Object::integer(left.wrapping_div(*right)))
        }
        (InfixOperationKind::LessThan, Object::Integer(left), Object::Integer(right)) => {
            Ok(Object::boolean(left < right))
        }
        (InfixOperationKind::GreaterThan, Object::Integer(left), Object::Integer(right)) => {
            Ok(Object::boolean(left > right))
        }
        (InfixOperationKind::Equal, Object::Integer(left), Object::Integer(right)) => {
            Ok(Object::boolean(left == right))
        }
        (InfixOperationKind::NotEqual, Object::Integer(left), Object::Integer(right)) => {
            Ok(Object::boolean(left != right))
        }
        (InfixOperationKind::Plus, Object::String(left), Object::String(right)) => {
            Ok(Object::string(format!("{}{}", left, right)))
        }
        (InfixOperationKind::Equal, Object::Boolean(left), Object::Boolean(right)) => {
            Ok(Object::boolean(left == right))
        }
        (InfixOperationKind::NotEqual, Object::Boolean(left), Object::Boolean(right)) => {
            Ok(Object::boolean(left != right))
        }
        _ => Err(EvaluationError::UnknownInfixOperator {
            left: left.object_type(),
            operation: kind,
            right: right.object_type(),
        }),
    }
}

fn eval_index_expression(
    left: &Gc<Object>,
    index: &Gc<Object>,
) -> Result<Gc<Object>, EvaluationError> {
    match (&**left, &**index) {
        (Object::Array(array), Object::Integer(index)) => Ok(usize::try_from(*index)
            .ok()
            .and_then(|index| array.get(index))
            .cloned()
            .unwrap_or_else(Object::null)),
        _ => Err(EvaluationError::IndexNotSupported {
            left: left.object_type(),
            index: index.object_type(),
        }),
    }
}

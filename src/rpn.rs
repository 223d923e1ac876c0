use crate::error::Error;
use crate::token::{Op, Token};

/// One instruction of a compiled expression
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Push a constant value
    Push(f64),
    /// -<top>
    Neg,
    /// <below> + <top>
    Add,
    /// <below> - <top>
    Sub,
    /// <below> * <top>
    Mul,
    /// <below> / <top>
    Div,
}

/// An arithmetic expression in reverse polish notation, run on a value
/// stack.
///
/// Building and running it are plain loops, so the size of the expression
/// is only bounded by memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    steps: Vec<Step>,
}

impl Program {
    /// Compile a vector of tokens in reverse polish notation.
    ///
    /// The depth of the value stack is tracked while reading, so that every
    /// operator is known to have its operands and exactly one value is left
    /// at the end.
    pub fn from_tokens(tokens: Vec<Token>) -> Result<Self, Error> {
        let mut steps = Vec::with_capacity(tokens.len());
        let mut depth = 0_usize;

        for token in tokens {
            match token {
                Token::Value(value) => {
                    let number = value
                        .parse()
                        .map_err(|_| Error::ParseError(format!("invalid number {}", value)))?;
                    steps.push(Step::Push(number));
                    depth += 1;
                }
                Token::Op(op) if op.is_unary() => {
                    if depth == 0 {
                        return Err(Error::ParseError("empty expression after sign".into()));
                    }
                    if op == Op::Neg {
                        steps.push(Step::Neg);
                    }
                }
                Token::Op(op) => {
                    if depth < 2 {
                        return Err(Error::ParseError("empty expression around operator".into()));
                    }
                    depth -= 1;
                    steps.push(match op {
                        Op::Plus => Step::Add,
                        Op::Minus => Step::Sub,
                        Op::Mul => Step::Mul,
                        Op::Div => Step::Div,
                        Op::Neg | Op::Pos => {
                            return Err(Error::ParseError("misplaced sign".into()))
                        }
                    });
                }
                other => {
                    return Err(Error::ParseError(format!(
                        "got {:?} token after shunting yard",
                        other
                    )))
                }
            }
        }

        match depth {
            0 => Err(Error::EmptyExpression),
            1 => Ok(Self { steps }),
            n => Err(Error::ParseError(format!(
                "{} unused value(s) in expression",
                n - 1
            ))),
        }
    }

    /// Run the program with plain `f64` arithmetic. Division by zero follows
    /// IEEE-754 and yields an infinity or `NaN`.
    pub fn eval(&self) -> f64 {
        let mut stack: Vec<f64> = Vec::new();
        for step in &self.steps {
            if let Step::Push(value) = *step {
                stack.push(value);
                continue;
            }
            let right = stack.pop().unwrap_or_default();
            let value = match *step {
                Step::Neg => -right,
                binary => {
                    let left = stack.pop().unwrap_or_default();
                    match binary {
                        Step::Add => left + right,
                        Step::Sub => left - right,
                        Step::Mul => left * right,
                        _ => left / right,
                    }
                }
            };
            stack.push(value);
        }
        stack.pop().unwrap_or_default()
    }
}

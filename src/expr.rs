use crate::lexer::{is_arithmetic, Lexer};
use crate::normalize::normalize;
use crate::rpn::Program;
use crate::variables::VariableState;
use crate::Error;
use serde::Serialize;
use tracing::{debug, warn};

/// Evaluate a formula against the current `variables`, falling back to `0`.
///
/// The formula is normalized, then parsed and evaluated as arithmetic. When
/// that fails the failure is logged and `0.0` is returned, so a malformed
/// formula never interrupts the caller. Use
/// [`evaluate_checked`](fn.evaluate_checked.html) to get the error instead.
///
/// # Example
///
/// ```
/// # use roi_cruncher::{evaluate, VariableState};
/// let variables: VariableState = vec![("hourly_rate", 40.0), ("hours", 50.0)]
///     .into_iter()
///     .collect();
/// assert_eq!(evaluate("hourly_rate * hours", &variables), 2000.0);
/// assert_eq!(evaluate("(hours", &variables), 0.0);
/// ```
pub fn evaluate(expression: &str, variables: &VariableState) -> f64 {
    evaluate_detailed(expression, variables).value()
}

/// Evaluate a formula against the current `variables`.
///
/// Returns `Ok(result)` if the normalized formula is valid arithmetic, or
/// `Err(cause)` otherwise.
///
/// # Example
///
/// ```
/// # use roi_cruncher::{evaluate_checked, Error, VariableState};
/// let variables = VariableState::new();
/// assert_eq!(evaluate_checked("2 + 3 * 4", &variables), Ok(14.0));
/// assert_eq!(evaluate_checked("abc", &variables), Err(Error::EmptyExpression));
/// ```
pub fn evaluate_checked(expression: &str, variables: &VariableState) -> Result<f64, Error> {
    let normalized = normalize(expression, variables);
    debug!(%expression, %normalized, "evaluating formula");
    Expr::parse(&normalized).map(|expr| expr.eval())
}

/// Evaluate a formula, keeping the reason of a fallback to `0` next to it.
pub fn evaluate_detailed(expression: &str, variables: &VariableState) -> Evaluation {
    match evaluate_checked(expression, variables) {
        Ok(value) => Evaluation::Computed(value),
        Err(err) => {
            warn!(%expression, %err, "formula could not be evaluated, using 0");
            Evaluation::Fallback(err)
        }
    }
}

/// Outcome of a fail-soft evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Evaluation {
    /// The formula evaluated to this value
    Computed(f64),
    /// The formula was rejected; its value is `0`
    Fallback(#[serde(serialize_with = "display")] Error),
}

impl Evaluation {
    /// The numeric result, `0.0` for a fallback
    pub fn value(&self) -> f64 {
        match *self {
            Self::Computed(value) => value,
            Self::Fallback(_) => 0.0,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    /// The reason of the fallback, if any
    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Computed(_) => None,
            Self::Fallback(err) => Some(err),
        }
    }
}

impl Default for Evaluation {
    fn default() -> Self {
        Self::Computed(0.0)
    }
}

fn display<S: serde::Serializer>(err: &Error, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(err)
}

/// A parsed arithmetic expression over numbers only.
///
/// # Examples
/// ```
/// # use roi_cruncher::Expr;
/// let expr = Expr::parse("3 + 5 * 2").unwrap();
/// assert_eq!(expr.eval(), 13.0);
///
/// let expr = Expr::parse("(2 + 3) * 4").unwrap();
/// assert_eq!(expr.eval(), 20.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    program: Program,
}

impl Expr {
    /// Parse the given arithmetic `expression` into an `Expr`.
    ///
    /// Any character outside of `0-9 . + - * / ( )` and whitespace is
    /// refused, whatever produced the string.
    ///
    /// # Examples
    /// ```
    /// # use roi_cruncher::Expr;
    /// // A valid expression
    /// assert!(Expr::parse("3 + 5 * 2").is_ok());
    /// // invalid expressions
    /// assert!(Expr::parse("3 + 5 *").is_err());
    /// assert!(Expr::parse("process.exit(1)").is_err());
    /// ```
    pub fn parse(expression: &str) -> Result<Self, Error> {
        if let Some(c) = expression
            .chars()
            .find(|&c| !is_arithmetic(c) && !c.is_whitespace())
        {
            return Err(Error::ForbiddenCharacter(c));
        }

        let mut lexer = Lexer::new(expression);
        let program = Program::from_tokens(lexer.parse()?)?;
        Ok(Self { program })
    }

    /// Evaluate the expression with IEEE-754 double arithmetic.
    pub fn eval(&self) -> f64 {
        self.program.eval()
    }
}

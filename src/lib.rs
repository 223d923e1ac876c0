#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::needless_return,
    clippy::missing_docs_in_private_items,
    clippy::non_ascii_literal,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]

//! roi-cruncher, safe evaluation of the formulas behind a change-management
//! return on investment.
//!
//! An initiative is described by two formulas, the cost of change and the
//! cost of no change, written over named variables. The net ROI is the cost
//! of no change minus the cost of change. The easiest way to evaluate a
//! single formula is the [`evaluate`](fn.evaluate.html) function:
//!
//! ```
//! use roi_cruncher::{evaluate, VariableState};
//!
//! let mut variables = VariableState::new();
//! variables.set("license_cost", 10000.0);
//! assert_eq!(evaluate("license_cost * 1.5", &variables), 15000.0);
//! ```
//!
//! A [`RoiSession`](struct.RoiSession.html) holds both formulas and the
//! variables they share, and recomputes the whole result on every edit:
//!
//! ```
//! use roi_cruncher::RoiSession;
//!
//! let payload = r#"{
//!     "coceqn": "license_cost + (training_hours * hourly_rate)",
//!     "cocvar": [
//!         ["license_cost", "Software licenses", "10000"],
//!         ["training_hours", "Hours of training", "50"],
//!         ["hourly_rate", "Average hourly rate", "40"]
//!     ],
//!     "conceqn": "license_cost * 1.5",
//!     "concvar": [["license_cost", "Software licenses", "10000"]]
//! }"#;
//!
//! let mut session = RoiSession::from_json(payload).unwrap();
//! assert_eq!(session.result().net_roi(), 3000.0);
//!
//! session.set_variable("hourly_rate", "60");
//! assert_eq!(session.result().cost_of_change(), 13000.0);
//! assert_eq!(session.result().net_roi(), 2000.0);
//! ```
//!
//! # Formula language
//!
//! A formula is normalized before evaluation: every variable name is replaced
//! by its current value, longest names first, then every character other
//! than digits, `.`, `+`, `-`, `*`, `/`, `(` and `)` is dropped. What remains
//! is parsed as infix arithmetic:
//!
//! - decimal literals: `12`, `0.5`, `.5`, `5.`;
//! - left and right parenthesis;
//! - `+`, `-`, `*` and `/`, with `*` and `/` binding tighter, all left
//!   associative;
//! - a leading `+` or `-` sign on an operand.
//!
//! The parser refuses any other character on its own, whatever the
//! normalizer let through. Arithmetic is plain `f64`: dividing by zero gives
//! an infinity or `NaN`.
//!
//! # Failures
//!
//! A formula that is not valid arithmetic evaluates to `0` through
//! [`evaluate`](fn.evaluate.html) and the failure is logged with `tracing`.
//! [`evaluate_checked`](fn.evaluate_checked.html) returns the
//! [`Error`](enum.Error.html) instead, and
//! [`evaluate_detailed`](fn.evaluate_detailed.html) returns an
//! [`Evaluation`](enum.Evaluation.html) telling a computed value apart from
//! a fallback. Numbers that can not be parsed are read as `0`.
//!
//! # Technical details
//!
//! Parsing uses a simple Shunting-Yard algorithm producing reverse polish
//! notation, which is checked and run on a value stack. Nothing recurses,
//! so a long formula costs memory, never stack.

#[macro_use]
extern crate lazy_static;

mod display;
mod error;
mod expr;
mod lexer;
mod normalize;
mod rpn;
mod session;
mod token;
mod variables;

pub use display::{format_amount, format_equation};
pub use error::Error;
pub use expr::{evaluate, evaluate_checked, evaluate_detailed, Evaluation, Expr};
pub use lexer::is_arithmetic;
pub use normalize::normalize;
pub use session::{EvaluationResult, FormulaGroup, Group, RawValue, RoiPayload, RoiSession};
pub use variables::{parse_number, parse_number_or_zero, VariableSpec, VariableState};

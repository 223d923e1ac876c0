//! Reduction of a formula to pure arithmetic text.

use crate::variables::VariableState;
use regex::Regex;

lazy_static! {
    /// Everything that is not a digit, a decimal point, an operator or a
    /// parenthesis.
    static ref NON_ARITHMETIC: Regex =
        Regex::new(r"[^0-9.+\-*/()]").expect("invalid arithmetic whitelist");
}

/// Substitute every variable of `variables` in `expression` with its current
/// value, then remove any character that is not part of `0-9 . + - * / ( )`.
///
/// Names are replaced longest first, so that `cost` can not eat the beginning
/// of `cost_per_hour`. Every occurrence of a name is replaced. Nothing else is
/// checked here: a malformed result is left for the evaluator to reject.
///
/// # Examples
///
/// ```
/// # use roi_cruncher::{normalize, VariableState};
/// let variables: VariableState = vec![("cost", 2.0), ("cost_per_hour", 5.0)]
///     .into_iter()
///     .collect();
/// assert_eq!(normalize("cost_per_hour * 2 + cost", &variables), "5*2+2");
/// ```
pub fn normalize(expression: &str, variables: &VariableState) -> String {
    let mut substituted = expression.to_string();
    for name in variables.names_by_length() {
        if name.is_empty() {
            continue;
        }
        if let Some(value) = variables.get(name) {
            substituted = substituted.replace(name, &value.to_string());
        }
    }
    NON_ARITHMETIC.replace_all(&substituted, "").into_owned()
}

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// A variable declared by a formula group: the token to substitute, its help
/// text and the value it starts with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSpec {
    /// Substitution token, without whitespace
    pub name: String,
    /// Human readable help text
    pub description: String,
    /// Value used to seed the variable state
    pub default_value: f64,
}

impl VariableSpec {
    pub fn new<N, D>(name: N, description: D, default_value: f64) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Self {
            name: name.into(),
            description: description.into(),
            default_value,
        }
    }

    /// Build a spec from a raw `[name, description, default]` triple. An
    /// unparsable default becomes `0`.
    pub fn from_raw(name: &str, description: &str, default_value: &str) -> Self {
        Self::new(name, description, parse_number_or_zero(default_value))
    }

    /// Name shown to a user, with underscores turned into spaces.
    ///
    /// ```
    /// # use roi_cruncher::VariableSpec;
    /// let spec = VariableSpec::new("training_hours", "", 50.0);
    /// assert_eq!(spec.label(), "training hours");
    /// ```
    pub fn label(&self) -> String {
        self.name.replace('_', " ")
    }

    /// Whether the variable reads as an amount of money, i.e. its name
    /// mentions a cost or a rate "per" something.
    pub fn is_monetary(&self) -> bool {
        let name = self.name.to_lowercase();
        name.contains("cost") || name.contains("per")
    }
}

/// The live mapping from variable name to current value, shared by both
/// formula groups of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VariableState {
    values: HashMap<String, f64>,
}

impl VariableState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a state from the default values of every spec. A name declared
    /// several times keeps the value of its last declaration.
    pub fn seeded<'a, I>(specs: I) -> Self
    where
        I: IntoIterator<Item = &'a VariableSpec>,
    {
        let mut state = Self::new();
        for spec in specs {
            state.set(spec.name.clone(), spec.default_value);
        }
        state
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn set<N: Into<String>>(&mut self, name: N, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Variable names, longest first. Names of equal length are sorted
    /// alphabetically so the order does not depend on the map.
    pub fn names_by_length(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.values.keys().map(String::as_str).collect();
        names.sort_unstable_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        names
    }
}

impl<N: Into<String>> std::iter::FromIterator<(N, f64)> for VariableState {
    fn from_iter<I: IntoIterator<Item = (N, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }
}

/// Parse a user supplied number.
///
/// Leading whitespace is skipped and the longest decimal prefix is used, so
/// trailing text is ignored. Input without any digit, or whose value is not
/// finite, is an error.
///
/// # Examples
///
/// ```
/// # use roi_cruncher::parse_number;
/// assert_eq!(parse_number("40"), Ok(40.0));
/// assert_eq!(parse_number(" -2.5e2 hours"), Ok(-250.0));
/// assert!(parse_number("forty").is_err());
/// ```
pub fn parse_number(raw: &str) -> Result<f64, Error> {
    let text = raw.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;
    let mut frac_digits = 0;
    if end < bytes.len() && bytes[end] == b'.' {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return Err(Error::InvalidNumber(raw.to_string()));
    }

    // an exponent only counts when digits follow it
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    match text[..end].parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(Error::InvalidNumber(raw.to_string())),
    }
}

/// Parse a user supplied number, falling back to `0` when it is not one.
pub fn parse_number_or_zero(raw: &str) -> f64 {
    parse_number(raw).unwrap_or_else(|err| {
        warn!(%err, "using 0 in place of an invalid number");
        0.0
    })
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("10000" => Ok(10000.0) ; "integer")]
    #[test_case("1.5" => Ok(1.5) ; "decimal")]
    #[test_case(".5" => Ok(0.5) ; "no integer part")]
    #[test_case("5." => Ok(5.0) ; "no fraction part")]
    #[test_case("  -3" => Ok(-3.0) ; "leading space and sign")]
    #[test_case("+7" => Ok(7.0) ; "explicit plus")]
    #[test_case("1e3" => Ok(1000.0) ; "exponent")]
    #[test_case("2e" => Ok(2.0) ; "dangling exponent")]
    #[test_case("12abc" => Ok(12.0) ; "trailing text")]
    #[test_case("1,000" => Ok(1.0) ; "thousands separator stops the number")]
    #[test_case("abc" => Err(Error::InvalidNumber("abc".into())) ; "no digits")]
    #[test_case("" => Err(Error::InvalidNumber("".into())) ; "empty")]
    #[test_case("." => Err(Error::InvalidNumber(".".into())) ; "lone point")]
    #[test_case("-" => Err(Error::InvalidNumber("-".into())) ; "lone sign")]
    #[test_case("$40" => Err(Error::InvalidNumber("$40".into())) ; "currency symbol")]
    #[test_case("inf" => Err(Error::InvalidNumber("inf".into())) ; "infinity is rejected")]
    #[test_case("NaN" => Err(Error::InvalidNumber("NaN".into())) ; "nan is rejected")]
    #[test_case("1e999" => Err(Error::InvalidNumber("1e999".into())) ; "overflow is rejected")]
    fn parse(raw: &str) -> Result<f64, Error> {
        parse_number(raw)
    }

    #[test]
    fn fallback_to_zero() {
        assert_eq!(parse_number_or_zero("sixty"), 0.0);
        assert_eq!(parse_number_or_zero("60"), 60.0);
    }

    #[test]
    fn seeding_keeps_last_declaration() {
        let specs = vec![
            VariableSpec::new("license_cost", "licenses", 10000.0),
            VariableSpec::new("hourly_rate", "rate", 40.0),
            VariableSpec::new("hourly_rate", "rate again", 45.0),
        ];
        let state = VariableState::seeded(&specs);
        assert_eq!(state.len(), 2);
        assert_eq!(state.get("license_cost"), Some(10000.0));
        assert_eq!(state.get("hourly_rate"), Some(45.0));
        assert_eq!(state.get("missing"), None);
    }

    #[test]
    fn names_are_sorted_longest_first() {
        let state: VariableState = vec![
            ("cost", 2.0),
            ("cost_per_hour", 5.0),
            ("rate", 1.0),
            ("hours", 3.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            state.names_by_length(),
            vec!["cost_per_hour", "hours", "cost", "rate"]
        );
    }

    #[test]
    fn spec_helpers() {
        let spec = VariableSpec::from_raw("Cost_per_hour", "hourly cost", "55.5");
        assert_eq!(spec.default_value, 55.5);
        assert_eq!(spec.label(), "Cost per hour");
        assert!(spec.is_monetary());

        let spec = VariableSpec::from_raw("training_hours", "hours", "lots");
        assert_eq!(spec.default_value, 0.0);
        assert!(!spec.is_monetary());
    }
}

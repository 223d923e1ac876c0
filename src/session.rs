//! Recomputation of the cost of change, the cost of no change and the net
//! ROI as variables are edited.
//!
//! A [`RoiSession`](struct.RoiSession.html) owns the two formula groups and
//! the single variable state they share. Every edit updates the state and
//! recomputes both formulas before returning, so the published
//! [`EvaluationResult`](struct.EvaluationResult.html) always matches the
//! current variables.

use crate::error::Error;
use crate::expr::{evaluate_detailed, Evaluation};
use crate::variables::{parse_number, parse_number_or_zero, VariableSpec, VariableState};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Which of the two formulas of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    CostOfChange,
    CostOfNoChange,
}

impl Group {
    pub fn title(self) -> &'static str {
        match self {
            Self::CostOfChange => "Cost of Change",
            Self::CostOfNoChange => "Cost of No Change",
        }
    }
}

/// A formula and the variables it documents.
///
/// The expression may also use names declared by the other group: values
/// come from the shared state, not from `variables`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormulaGroup {
    pub expression: String,
    pub variables: Vec<VariableSpec>,
}

impl FormulaGroup {
    pub fn new<E: Into<String>>(expression: E, variables: Vec<VariableSpec>) -> Self {
        Self {
            expression: expression.into(),
            variables,
        }
    }
}

/// A default value as found in a payload: the upstream step sends strings,
/// but plain JSON numbers are accepted too.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    pub fn to_number(&self) -> f64 {
        match *self {
            Self::Number(value) if value.is_finite() => value,
            Self::Number(_) => 0.0,
            Self::Text(ref text) => parse_number_or_zero(text),
        }
    }
}

/// The inbound payload: two formulas and their `[name, description,
/// default]` triples.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoiPayload {
    #[serde(rename = "coceqn", default)]
    pub cost_of_change: String,
    #[serde(rename = "cocvar", default)]
    pub cost_of_change_variables: Vec<(String, String, RawValue)>,
    #[serde(rename = "conceqn", default)]
    pub cost_of_no_change: String,
    #[serde(rename = "concvar", default)]
    pub cost_of_no_change_variables: Vec<(String, String, RawValue)>,
}

impl RoiPayload {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Split the payload into the cost-of-change and cost-of-no-change groups.
    pub fn into_groups(self) -> (FormulaGroup, FormulaGroup) {
        fn specs(raw: Vec<(String, String, RawValue)>) -> Vec<VariableSpec> {
            raw.into_iter()
                .map(|(name, description, value)| {
                    let default_value = value.to_number();
                    VariableSpec::new(name, description, default_value)
                })
                .collect()
        }

        (
            FormulaGroup::new(self.cost_of_change, specs(self.cost_of_change_variables)),
            FormulaGroup::new(
                self.cost_of_no_change,
                specs(self.cost_of_no_change_variables),
            ),
        )
    }
}

/// The three figures derived from the current variables.
///
/// `net_roi` is computed from the two costs when the result is built and
/// can not be set on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EvaluationResult {
    cost_of_change: f64,
    cost_of_no_change: f64,
    net_roi: f64,
}

impl EvaluationResult {
    pub fn new(cost_of_change: f64, cost_of_no_change: f64) -> Self {
        Self {
            cost_of_change,
            cost_of_no_change,
            net_roi: cost_of_no_change - cost_of_change,
        }
    }

    pub fn cost_of_change(&self) -> f64 {
        self.cost_of_change
    }

    pub fn cost_of_no_change(&self) -> f64 {
        self.cost_of_no_change
    }

    /// `cost_of_no_change - cost_of_change`
    pub fn net_roi(&self) -> f64 {
        self.net_roi
    }
}

/// Both formula groups of an initiative, their shared variables and the
/// latest result.
#[derive(Debug, Clone)]
pub struct RoiSession {
    cost_of_change: FormulaGroup,
    cost_of_no_change: FormulaGroup,
    variables: VariableState,
    change_outcome: Evaluation,
    no_change_outcome: Evaluation,
    result: EvaluationResult,
}

impl RoiSession {
    /// Create a session, seeding the variables from the defaults of both
    /// groups, and compute the first result.
    ///
    /// # Examples
    ///
    /// ```
    /// # use roi_cruncher::{FormulaGroup, RoiSession, VariableSpec};
    /// let change = FormulaGroup::new(
    ///     "licenses * seat_cost",
    ///     vec![
    ///         VariableSpec::new("licenses", "seats to buy", 20.0),
    ///         VariableSpec::new("seat_cost", "price of a seat", 100.0),
    ///     ],
    /// );
    /// let no_change = FormulaGroup::new(
    ///     "lost_hours * 40",
    ///     vec![VariableSpec::new("lost_hours", "hours lost per year", 80.0)],
    /// );
    /// let mut session = RoiSession::new(change, no_change);
    /// assert_eq!(session.result().net_roi(), 1200.0);
    ///
    /// session.set_variable("lost_hours", "30");
    /// assert_eq!(session.result().net_roi(), -800.0);
    /// ```
    pub fn new(cost_of_change: FormulaGroup, cost_of_no_change: FormulaGroup) -> Self {
        let variables = VariableState::seeded(
            cost_of_change
                .variables
                .iter()
                .chain(cost_of_no_change.variables.iter()),
        );
        let mut session = Self {
            cost_of_change,
            cost_of_no_change,
            variables,
            change_outcome: Evaluation::default(),
            no_change_outcome: Evaluation::default(),
            result: EvaluationResult::default(),
        };
        session.recompute();
        session
    }

    pub fn from_payload(payload: RoiPayload) -> Self {
        let (cost_of_change, cost_of_no_change) = payload.into_groups();
        Self::new(cost_of_change, cost_of_no_change)
    }

    /// Decode a JSON payload and build a session from it.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        RoiPayload::from_json(json).map(Self::from_payload)
    }

    /// Replace both groups and reseed every variable from the new defaults.
    pub fn reload(&mut self, payload: RoiPayload) {
        *self = Self::from_payload(payload);
    }

    /// Parse `raw_value` (`0` when it is not a number), store it under
    /// `name` and recompute both formulas.
    pub fn set_variable(&mut self, name: &str, raw_value: &str) {
        let value = parse_number_or_zero(raw_value);
        self.set_value(name, value);
    }

    /// Store `value` under `name` and recompute both formulas. A value that
    /// is not finite is stored as `0`.
    pub fn set_value(&mut self, name: &str, value: f64) {
        let value = if value.is_finite() {
            value
        } else {
            warn!(%name, %value, "using 0 in place of a non-finite value");
            0.0
        };
        self.variables.set(name, value);
        self.recompute();
    }

    /// Like [`set_variable`](#method.set_variable), but refuses names that
    /// neither group declares and values that are not numbers. The state is
    /// left untouched on error.
    pub fn try_set_variable(&mut self, name: &str, raw_value: &str) -> Result<(), Error> {
        if !self.variables.contains(name) {
            return Err(Error::UnknownVariable(name.to_string()));
        }
        let value = parse_number(raw_value)?;
        self.set_value(name, value);
        Ok(())
    }

    fn recompute(&mut self) {
        let change = evaluate_detailed(&self.cost_of_change.expression, &self.variables);
        let no_change = evaluate_detailed(&self.cost_of_no_change.expression, &self.variables);
        let result = EvaluationResult::new(change.value(), no_change.value());
        debug!(
            cost_of_change = result.cost_of_change(),
            cost_of_no_change = result.cost_of_no_change(),
            net_roi = result.net_roi(),
            "recomputed"
        );
        self.change_outcome = change;
        self.no_change_outcome = no_change;
        self.result = result;
    }

    pub fn result(&self) -> EvaluationResult {
        self.result
    }

    pub fn variables(&self) -> &VariableState {
        &self.variables
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.variables.get(name)
    }

    pub fn group(&self, group: Group) -> &FormulaGroup {
        match group {
            Group::CostOfChange => &self.cost_of_change,
            Group::CostOfNoChange => &self.cost_of_no_change,
        }
    }

    /// The outcome of the latest evaluation of a group's formula, telling a
    /// real `0` apart from a fallback.
    pub fn outcome(&self, group: Group) -> &Evaluation {
        match group {
            Group::CostOfChange => &self.change_outcome,
            Group::CostOfNoChange => &self.no_change_outcome,
        }
    }

    /// The specs a group documents, each with its current value.
    pub fn variables_for(&self, group: Group) -> impl Iterator<Item = (&VariableSpec, f64)> + '_ {
        self.group(group).variables.iter().map(move |spec| {
            let value = self.variables.get(&spec.name).unwrap_or(spec.default_value);
            (spec, value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAYLOAD: &str = r#"{
        "coceqn": "license_cost + (training_hours * hourly_rate)",
        "cocvar": [
            ["license_cost", "Software licenses", "10000"],
            ["training_hours", "Hours of training", "50"],
            ["hourly_rate", "Average hourly rate", "40"]
        ],
        "conceqn": "license_cost * 1.5",
        "concvar": [
            ["license_cost", "Software licenses", "10000"]
        ]
    }"#;

    #[test]
    fn end_to_end() {
        let session = RoiSession::from_json(PAYLOAD).unwrap();
        assert_eq!(session.result(), EvaluationResult::new(12000.0, 15000.0));
        assert_eq!(session.result().net_roi(), 3000.0);
        assert_eq!(session.variables().len(), 3);
    }

    #[test]
    fn edit_recomputes_both_formulas() {
        let mut session = RoiSession::from_json(PAYLOAD).unwrap();
        session.set_variable("hourly_rate", "60");

        let result = session.result();
        assert_eq!(result.cost_of_change(), 13000.0);
        assert_eq!(result.cost_of_no_change(), 15000.0);
        assert_eq!(result.net_roi(), 2000.0);
    }

    #[test]
    fn shared_variable_moves_both_costs() {
        let mut session = RoiSession::from_json(PAYLOAD).unwrap();
        session.set_variable("license_cost", "20000");
        assert_eq!(session.result(), EvaluationResult::new(22000.0, 30000.0));
    }

    #[test]
    fn unparsable_edit_becomes_zero() {
        let mut session = RoiSession::from_json(PAYLOAD).unwrap();
        session.set_variable("training_hours", "a lot");
        assert_eq!(session.value("training_hours"), Some(0.0));
        assert_eq!(session.result().cost_of_change(), 10000.0);
    }

    #[test]
    fn unknown_name_is_still_stored() {
        let mut session = RoiSession::from_json(PAYLOAD).unwrap();
        session.set_variable("contingency", "5");
        assert_eq!(session.value("contingency"), Some(5.0));
        assert_eq!(session.result(), EvaluationResult::new(12000.0, 15000.0));
    }

    #[test]
    fn non_finite_value_becomes_zero() {
        let mut session = RoiSession::from_json(PAYLOAD).unwrap();
        session.set_value("training_hours", f64::NAN);
        assert_eq!(session.value("training_hours"), Some(0.0));
        assert_eq!(session.result().cost_of_change(), 10000.0);
    }

    #[test]
    fn checked_edit() {
        let mut session = RoiSession::from_json(PAYLOAD).unwrap();
        assert_eq!(
            session.try_set_variable("contingency", "5"),
            Err(Error::UnknownVariable("contingency".into()))
        );
        assert_eq!(
            session.try_set_variable("hourly_rate", "sixty"),
            Err(Error::InvalidNumber("sixty".into()))
        );
        assert_eq!(session.value("hourly_rate"), Some(40.0));
        assert_eq!(session.try_set_variable("hourly_rate", "60"), Ok(()));
        assert_eq!(session.result().net_roi(), 2000.0);
    }

    #[test]
    fn broken_formula_does_not_stop_its_sibling() {
        let change = FormulaGroup::new("(seats * 10", vec![VariableSpec::new("seats", "", 3.0)]);
        let no_change = FormulaGroup::new("seats * 100", vec![]);
        let session = RoiSession::new(change, no_change);

        assert_eq!(session.result(), EvaluationResult::new(0.0, 300.0));
        assert!(session.outcome(Group::CostOfChange).is_fallback());
        assert_eq!(
            session.outcome(Group::CostOfNoChange),
            &Evaluation::Computed(300.0)
        );
    }

    #[test]
    fn payload_defaults() {
        let json = r#"{
            "coceqn": "a + b + c",
            "cocvar": [["a", "number default", 2.5], ["b", "broken default", "n/a"]],
            "conceqn": "c",
            "concvar": [["c", "later declaration wins", "1"], ["c", "", "4"]]
        }"#;
        let session = RoiSession::from_json(json).unwrap();
        assert_eq!(session.value("a"), Some(2.5));
        assert_eq!(session.value("b"), Some(0.0));
        assert_eq!(session.value("c"), Some(4.0));
        assert_eq!(session.result(), EvaluationResult::new(6.5, 4.0));
    }

    #[test]
    fn missing_fields_are_empty() {
        let session = RoiSession::from_json("{}").unwrap();
        assert!(session.variables().is_empty());
        assert_eq!(session.result(), EvaluationResult::default());
        assert!(session.outcome(Group::CostOfChange).is_fallback());
    }

    #[test]
    fn invalid_payload() {
        let err = RoiSession::from_json(r#"{"cocvar": "nope"}"#).unwrap_err();
        assert!(matches!(err, Error::Payload(_)));
    }

    #[test]
    fn reload_reseeds_variables() {
        let mut session = RoiSession::from_json(PAYLOAD).unwrap();
        session.set_variable("hourly_rate", "60");
        session.set_variable("extra", "1");

        session.reload(RoiPayload::from_json(PAYLOAD).unwrap());
        assert_eq!(session.value("hourly_rate"), Some(40.0));
        assert_eq!(session.value("extra"), None);
        assert_eq!(session.result().net_roi(), 3000.0);
    }

    #[test]
    fn variables_for_group() {
        let mut session = RoiSession::from_json(PAYLOAD).unwrap();
        session.set_variable("license_cost", "12000");
        let listed: Vec<(&str, f64)> = session
            .variables_for(Group::CostOfNoChange)
            .map(|(spec, value)| (spec.name.as_str(), value))
            .collect();
        assert_eq!(listed, vec![("license_cost", 12000.0)]);
        assert_eq!(session.variables_for(Group::CostOfChange).count(), 3);
    }

    #[test]
    fn result_serializes() {
        let json = serde_json::to_value(EvaluationResult::new(12000.0, 15000.0)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "cost_of_change": 12000.0,
                "cost_of_no_change": 15000.0,
                "net_roi": 3000.0
            })
        );
    }
}

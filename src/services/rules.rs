//! Ordered field-extraction rules for provider payloads.
//!
//! Providers name the same thing a dozen ways, so every lookup is written as
//! a table of `(path, transform)` rules. The interpreter walks the table in
//! order and the first rule whose path exists and whose value survives the
//! transform wins. Nothing is merged across rules.

use serde_json::Value;
use std::sync::OnceLock;

/// One hop into a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Object member by name.
    Key(&'static str),
    /// First element of an array.
    First,
    /// Every element of an array.
    Each,
}

/// How a located value is turned into a usable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Non-empty string, trimmed.
    Text,
    /// Finite number, or a string holding one.
    Number,
    /// Like `Number`, but negative values don't count.
    NonNegative,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Text(String),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub path: Vec<Step>,
    pub transform: Transform,
}

impl Rule {
    pub fn new(path: Vec<Step>, transform: Transform) -> Self {
        Self { path, transform }
    }

    /// All values this rule yields, in document order.
    pub fn apply(&self, value: &Value) -> Vec<Extracted> {
        locate(value, &self.path)
            .into_iter()
            .filter_map(|v| transform(v, self.transform))
            .collect()
    }
}

fn resolve<'a>(value: &'a Value, path: &[Step], out: &mut Vec<&'a Value>) {
    let Some((step, rest)) = path.split_first() else {
        out.push(value);
        return;
    };

    match step {
        Step::Key(key) => {
            if let Some(next) = value.as_object().and_then(|o| o.get(*key)) {
                resolve(next, rest, out);
            }
        }
        Step::First => {
            if let Some(next) = value.as_array().and_then(|a| a.first()) {
                resolve(next, rest, out);
            }
        }
        Step::Each => {
            if let Some(items) = value.as_array() {
                for next in items {
                    resolve(next, rest, out);
                }
            }
        }
    }
}

fn transform(value: &Value, transform: Transform) -> Option<Extracted> {
    match transform {
        Transform::Text => {
            let text = value.as_str()?.trim();
            (!text.is_empty()).then(|| Extracted::Text(text.to_string()))
        }
        Transform::Number => as_number(value).map(Extracted::Number),
        Transform::NonNegative => as_number(value)
            .filter(|n| *n >= 0.0)
            .map(Extracted::Number),
    }
}

/// Reads a JSON number, or a string like `"250"`, `"250 kcal"` or `"87%"`.
fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s
                .trim()
                .trim_end_matches(|c: char| c.is_alphabetic() || c == '%' || c.is_whitespace());
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// First rule that yields a value wins.
pub fn first_match(rules: &[Rule], value: &Value) -> Option<Extracted> {
    rules
        .iter()
        .find_map(|rule| rule.apply(value).into_iter().next())
}

pub fn first_text(rules: &[Rule], value: &Value) -> Option<String> {
    match first_match(rules, value)? {
        Extracted::Text(s) => Some(s),
        Extracted::Number(_) => None,
    }
}

pub fn first_number(rules: &[Rule], value: &Value) -> Option<f64> {
    match first_match(rules, value)? {
        Extracted::Number(n) => Some(n),
        Extracted::Text(_) => None,
    }
}

/// Every value reached by `path`, in document order.
pub fn locate<'a>(value: &'a Value, path: &[Step]) -> Vec<&'a Value> {
    let mut located = Vec::new();
    resolve(value, path, &mut located);
    located
}

// Rule tables

pub const LABEL_KEYS: &[&str] = &["label", "name", "food", "prediction", "class", "title", "group"];
pub const CALORIE_KEYS: &[&str] = &["calories", "calorie", "kcal", "energy_kcal", "cal"];
pub const NUTRITION_KEYS: &[&str] = &["nutrition", "nutrients"];
pub const CONFIDENCE_KEYS: &[&str] = &["confidence", "score", "probability", "prob", "conf"];
/// Arrays that hold the components of a composite dish.
pub const SUB_ITEM_KEYS: &[&str] = &["items", "components", "ingredients"];

fn keyed(keys: &[&'static str], transform: Transform) -> Vec<Rule> {
    keys.iter()
        .map(|k| Rule::new(vec![Step::Key(*k)], transform))
        .collect()
}

/// Calorie rules that look only at the item itself.
fn item_calorie_rules() -> Vec<Rule> {
    let mut rules = keyed(CALORIE_KEYS, Transform::NonNegative);
    for parent in NUTRITION_KEYS {
        for key in CALORIE_KEYS {
            rules.push(Rule::new(
                vec![Step::Key(*parent), Step::Key(*key)],
                Transform::NonNegative,
            ));
        }
    }
    rules
}

pub fn label_rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| keyed(LABEL_KEYS, Transform::Text))
}

/// Direct fields, then `nutrition`/`nutrients`, then the same again on the
/// first sub-item.
pub fn calorie_rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| {
        let item_level = item_calorie_rules();
        let mut rules = item_level.clone();
        for list in SUB_ITEM_KEYS {
            for rule in &item_level {
                let mut path = vec![Step::Key(*list), Step::First];
                path.extend_from_slice(&rule.path);
                rules.push(Rule::new(path, rule.transform));
            }
        }
        rules
    })
}

pub fn confidence_rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| keyed(CONFIDENCE_KEYS, Transform::Number))
}

/// Components of a composite dish, across all sub-item lists.
pub fn sub_items(item: &Value) -> Vec<&Value> {
    SUB_ITEM_KEYS
        .iter()
        .flat_map(|list| locate(item, &[Step::Key(*list), Step::Each]))
        .collect()
}

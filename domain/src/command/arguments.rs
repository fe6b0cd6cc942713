use crate::command::{CommandError, Die, Number, Value};

/// Coerced arguments in positional order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Vec<Value>);

impl Arguments {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn text(&self, index: usize) -> Result<&str, CommandError> {
        self.get(index)
            .and_then(Value::as_text)
            .ok_or_else(|| missing(index, "text"))
    }

    pub fn integer(&self, index: usize) -> Result<i64, CommandError> {
        self.get(index)
            .and_then(Value::as_integer)
            .ok_or_else(|| missing(index, "integer"))
    }

    pub fn optional_integer(&self, index: usize) -> Option<i64> {
        self.get(index).and_then(Value::as_integer)
    }

    pub fn optional_die(&self, index: usize) -> Option<Die> {
        self.get(index).and_then(Value::as_die)
    }

    pub fn optional_text(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(Value::as_text)
    }

    /// Every argument from `start` on, as text.
    pub fn texts_from(&self, start: usize) -> Result<Vec<&str>, CommandError> {
        (start..self.len()).map(|index| self.text(index)).collect()
    }

    pub fn numbers(&self) -> Result<Vec<Number>, CommandError> {
        self.0
            .iter()
            .enumerate()
            .map(|(index, value)| value.as_number().ok_or_else(|| missing(index, "number")))
            .collect()
    }
}

fn missing(index: usize, expected: &str) -> CommandError {
    CommandError::unexpected(format!("argument {index} is not a {expected}"))
}

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Converts one raw token into a typed [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercer {
    Text,
    Integer,
    PositiveInteger,
    Number,
    Die,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{token}` is not {expected}")]
pub struct CoercionError {
    pub token: String,
    pub expected: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Number(Number),
    Die(Die),
    Boolean(bool),
}

impl Coercer {
    pub fn coerce(self, token: &str) -> Result<Value, CoercionError> {
        let reject = || CoercionError {
            token: token.to_string(),
            expected: self.expected(),
        };

        match self {
            Coercer::Text => Ok(Value::Text(token.to_string())),
            Coercer::Integer => token.parse().map(Value::Integer).map_err(|_| reject()),
            Coercer::PositiveInteger => {
                if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(reject());
                }
                match token.parse::<i64>() {
                    Ok(value) if value >= 1 => Ok(Value::Integer(value)),
                    _ => Err(reject()),
                }
            }
            Coercer::Number => token
                .parse::<f64>()
                .ok()
                .and_then(Number::new)
                .map(Value::Number)
                .ok_or_else(reject),
            Coercer::Die => token.parse().map(Value::Die).map_err(|_| reject()),
            Coercer::Boolean => match token.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(Value::Boolean(true)),
                "false" | "no" | "off" | "0" => Ok(Value::Boolean(false)),
                _ => Err(reject()),
            },
        }
    }

    pub fn expected(self) -> &'static str {
        match self {
            Coercer::Text => "text",
            Coercer::Integer => "an integer",
            Coercer::PositiveInteger => "a positive integer",
            Coercer::Number => "a number",
            Coercer::Die => "one of d4, d6, d8, d10, d12, d20",
            Coercer::Boolean => "true or false",
        }
    }
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(value) => Some(*value),
            Value::Integer(value) => Number::new(*value as f64),
            _ => None,
        }
    }

    pub fn as_die(&self) -> Option<Die> {
        match self {
            Value::Die(die) => Some(*die),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(value) => Some(*value),
            _ => None,
        }
    }
}

/// A finite floating point value that prints whole values without a fraction.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Number(f64);

impl Number {
    pub fn new(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        // -0.0 would otherwise print as "-0"
        Some(Self(if value == 0.0 { 0.0 } else { value }))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Die {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
}

impl Die {
    pub const ALL: [Die; 6] = [Die::D4, Die::D6, Die::D8, Die::D10, Die::D12, Die::D20];

    pub fn sides(self) -> u32 {
        match self {
            Die::D4 => 4,
            Die::D6 => 6,
            Die::D8 => 8,
            Die::D10 => 10,
            Die::D12 => 12,
            Die::D20 => 20,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Die::D4 => "d4",
            Die::D6 => "d6",
            Die::D8 => "d8",
            Die::D10 => "d10",
            Die::D12 => "d12",
            Die::D20 => "d20",
        }
    }
}

impl FromStr for Die {
    type Err = CoercionError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let lowercase = token.to_ascii_lowercase();
        Die::ALL
            .into_iter()
            .find(|die| die.as_str() == lowercase)
            .ok_or_else(|| CoercionError {
                token: token.to_string(),
                expected: Coercer::Die.expected(),
            })
    }
}

impl fmt::Display for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(token: &str) -> String {
        match Coercer::Number.coerce(token) {
            Ok(Value::Number(number)) => number.to_string(),
            other => panic!("unexpected coercion result {other:?}"),
        }
    }

    #[test]
    fn die_accepts_known_sizes_in_any_case() {
        for token in ["d4", "D6", "d8", "D10", "d12", "D20"] {
            let value = Coercer::Die.coerce(token).unwrap();
            assert_eq!(
                value.as_die().unwrap().as_str(),
                token.to_ascii_lowercase()
            );
        }
    }

    #[test]
    fn die_rejects_anything_else() {
        for token in ["d3", "d100", "20", "d 20", "", "dd20"] {
            let error = Coercer::Die.coerce(token).unwrap_err();
            assert_eq!(error.token, token);
        }
    }

    #[test]
    fn whole_numbers_display_without_fraction() {
        assert_eq!(number("7.0"), "7");
        assert_eq!(number("7"), "7");
        assert_eq!(number("-0.0"), "0");
        assert_eq!(number("3.4"), "3.4");
        assert_eq!(number("-2.50"), "-2.5");
    }

    #[test]
    fn number_rejects_non_finite_and_garbage() {
        for token in ["inf", "NaN", "-infinity", "seven", "1,5", ""] {
            assert!(Coercer::Number.coerce(token).is_err(), "{token}");
        }
    }

    #[test]
    fn positive_integer_only_accepts_plain_digits() {
        assert_eq!(
            Coercer::PositiveInteger.coerce("42").unwrap(),
            Value::Integer(42)
        );
        assert_eq!(
            Coercer::PositiveInteger.coerce("007").unwrap(),
            Value::Integer(7)
        );
        for token in ["0", "-1", "+1", " 1", "1.0", "", "99999999999999999999"] {
            assert!(Coercer::PositiveInteger.coerce(token).is_err(), "{token}");
        }
    }

    #[test]
    fn integer_accepts_sign() {
        assert_eq!(Coercer::Integer.coerce("-5").unwrap(), Value::Integer(-5));
        assert!(Coercer::Integer.coerce("5.5").is_err());
    }

    #[test]
    fn boolean_accepts_common_spellings() {
        assert_eq!(Coercer::Boolean.coerce("Yes").unwrap(), Value::Boolean(true));
        assert_eq!(Coercer::Boolean.coerce("off").unwrap(), Value::Boolean(false));
        assert!(Coercer::Boolean.coerce("maybe").is_err());
    }
}

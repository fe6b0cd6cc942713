use std::fmt;

/// How many argument tokens a command accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Zero,
    Exact(usize),
    AtLeast(usize),
    AtMost(usize),
}

impl Arity {
    pub fn accepts(self, supplied: usize) -> bool {
        match self {
            Arity::Zero => supplied == 0,
            Arity::Exact(expected) => supplied == expected,
            Arity::AtLeast(minimum) => supplied >= minimum,
            Arity::AtMost(maximum) => supplied <= maximum,
        }
    }

    /// The last parameter repeats over surplus tokens.
    pub fn is_variadic(self) -> bool {
        matches!(self, Arity::AtLeast(_))
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Zero => f.write_str("no arguments"),
            Arity::Exact(expected) => write!(f, "exactly {expected}"),
            Arity::AtLeast(minimum) => write!(f, "at least {minimum}"),
            Arity::AtMost(maximum) => write!(f, "at most {maximum}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matches_each_shape() {
        assert!(Arity::Zero.accepts(0));
        assert!(!Arity::Zero.accepts(1));
        assert!(Arity::Exact(2).accepts(2));
        assert!(!Arity::Exact(2).accepts(3));
        assert!(!Arity::AtLeast(1).accepts(0));
        assert!(Arity::AtLeast(1).accepts(10));
        assert!(Arity::AtMost(1).accepts(0));
        assert!(!Arity::AtMost(1).accepts(2));
    }
}

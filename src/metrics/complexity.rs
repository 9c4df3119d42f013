/*!
# Complexity Algebra

Big-O values and the two operations the analyzers combine them with.

`add` is sequential composition (the dominant term wins) and `multiply` is
nesting. Ranked values carry their polynomial degree so that nesting past
cubic keeps counting (`O(n^4)`, `O(n^5)`, ...). Symbolic values hold a
literal expression such as a constant array size.
*/

use serde::{Deserialize, Serialize};
use std::fmt;

/// Growth class, ordered from slowest to fastest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComplexityClass {
    Constant,
    Logarithmic,
    Linear,
    Linearithmic,
    Quadratic,
    Cubic,
    Exponential,
}

impl ComplexityClass {
    pub const ALL: [ComplexityClass; 7] = [
        ComplexityClass::Constant,
        ComplexityClass::Logarithmic,
        ComplexityClass::Linear,
        ComplexityClass::Linearithmic,
        ComplexityClass::Quadratic,
        ComplexityClass::Cubic,
        ComplexityClass::Exponential,
    ];

    /// Polynomial exponent of the class's canonical member
    fn base_degree(self) -> u32 {
        match self {
            ComplexityClass::Constant
            | ComplexityClass::Logarithmic
            | ComplexityClass::Exponential => 0,
            ComplexityClass::Linear | ComplexityClass::Linearithmic => 1,
            ComplexityClass::Quadratic => 2,
            ComplexityClass::Cubic => 3,
        }
    }

    fn has_log_factor(self) -> bool {
        matches!(
            self,
            ComplexityClass::Logarithmic | ComplexityClass::Linearithmic
        )
    }
}

/// An asymptotic bound
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Complexity {
    Ranked { class: ComplexityClass, degree: u32 },
    Symbolic(String),
}

impl Complexity {
    pub fn of(class: ComplexityClass) -> Self {
        Complexity::Ranked {
            class,
            degree: class.base_degree(),
        }
    }

    pub fn constant() -> Self {
        Self::of(ComplexityClass::Constant)
    }

    pub fn logarithmic() -> Self {
        Self::of(ComplexityClass::Logarithmic)
    }

    pub fn linear() -> Self {
        Self::of(ComplexityClass::Linear)
    }

    pub fn linearithmic() -> Self {
        Self::of(ComplexityClass::Linearithmic)
    }

    pub fn quadratic() -> Self {
        Self::of(ComplexityClass::Quadratic)
    }

    pub fn cubic() -> Self {
        Self::of(ComplexityClass::Cubic)
    }

    pub fn exponential() -> Self {
        Self::of(ComplexityClass::Exponential)
    }

    /// `O(n^k)`; degrees above three stay in the cubic tier
    pub fn polynomial(k: u32) -> Self {
        match k {
            0 => Self::constant(),
            1 => Self::linear(),
            2 => Self::quadratic(),
            _ => Complexity::Ranked {
                class: ComplexityClass::Cubic,
                degree: k,
            },
        }
    }

    pub fn symbolic(expression: impl Into<String>) -> Self {
        Complexity::Symbolic(expression.into())
    }

    pub fn class(&self) -> Option<ComplexityClass> {
        match self {
            Complexity::Ranked { class, .. } => Some(*class),
            Complexity::Symbolic(_) => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.class() == Some(ComplexityClass::Constant)
    }

    /// Sequential composition: keeps the dominant term
    pub fn add(&self, other: &Complexity) -> Complexity {
        use Complexity::*;

        if self.is_constant() {
            return other.clone();
        }
        if other.is_constant() {
            return self.clone();
        }

        match (self, other) {
            (Symbolic(a), Symbolic(b)) => Symbolic(format!("{} + {}", a, b)),
            (Symbolic(_), ranked @ Ranked { .. }) | (ranked @ Ranked { .. }, Symbolic(_)) => {
                ranked.clone()
            }
            (
                Ranked {
                    class: ca,
                    degree: da,
                },
                Ranked {
                    class: cb,
                    degree: db,
                },
            ) => {
                if (ca, da) >= (cb, db) {
                    self.clone()
                } else {
                    other.clone()
                }
            }
        }
    }

    /// Nesting: the bound of doing `other` once per step of `self`.
    ///
    /// Ranked values carry no log flag above linear, so a product such as
    /// `n^2 log n` is reported as the upper bound `O(n^3)`.
    pub fn multiply(&self, other: &Complexity) -> Complexity {
        use Complexity::*;

        if self.is_constant() {
            return other.clone();
        }
        if other.is_constant() {
            return self.clone();
        }

        match (self, other) {
            (Symbolic(a), Symbolic(b)) => {
                Symbolic(format!("{} * {}", parenthesize(a), parenthesize(b)))
            }
            (Symbolic(_), ranked @ Ranked { .. }) | (ranked @ Ranked { .. }, Symbolic(_)) => {
                ranked.clone()
            }
            (
                Ranked {
                    class: ca,
                    degree: da,
                },
                Ranked {
                    class: cb,
                    degree: db,
                },
            ) => {
                if *ca == ComplexityClass::Exponential || *cb == ComplexityClass::Exponential {
                    return Self::exponential();
                }

                let degree = da + db;
                let logarithmic = ca.has_log_factor() || cb.has_log_factor();
                match (degree, logarithmic) {
                    // log * log collapses to log
                    (0, _) => Self::logarithmic(),
                    (1, true) => Self::linearithmic(),
                    // n^d log n rounds up to n^(d+1)
                    (d, true) => Self::polynomial(d + 1),
                    (d, false) => Self::polynomial(d),
                }
            }
        }
    }

    /// Big-O notation, e.g. `O(n log n)`
    pub fn notation(&self) -> String {
        self.to_string()
    }
}

fn parenthesize(expression: &str) -> String {
    if expression.contains('+') {
        format!("({})", expression)
    } else {
        expression.to_string()
    }
}

impl Default for Complexity {
    fn default() -> Self {
        Self::constant()
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Complexity::Symbolic(expression) => write!(f, "O({})", expression),
            Complexity::Ranked { class, degree } => match class {
                ComplexityClass::Constant => write!(f, "O(1)"),
                ComplexityClass::Logarithmic => write!(f, "O(log n)"),
                ComplexityClass::Linear => write!(f, "O(n)"),
                ComplexityClass::Linearithmic => write!(f, "O(n log n)"),
                ComplexityClass::Quadratic => write!(f, "O(n^2)"),
                ComplexityClass::Cubic => write!(f, "O(n^{})", (*degree).max(3)),
                ComplexityClass::Exponential => write!(f, "O(2^n)"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all() -> Vec<Complexity> {
        ComplexityClass::ALL.iter().map(|c| Complexity::of(*c)).collect()
    }

    #[test]
    fn test_notation() {
        let rendered: Vec<String> = all().iter().map(|c| c.notation()).collect();
        assert_eq!(
            rendered,
            vec!["O(1)", "O(log n)", "O(n)", "O(n log n)", "O(n^2)", "O(n^3)", "O(2^n)"]
        );
        assert_eq!(Complexity::polynomial(5).to_string(), "O(n^5)");
        assert_eq!(Complexity::symbolic("200").to_string(), "O(200)");
    }

    #[test]
    fn test_add_keeps_dominant_term() {
        for a in all() {
            for b in all() {
                let expected = if a.class() >= b.class() { &a } else { &b };
                assert_eq!(&a.add(&b), expected, "{} + {}", a, b);
                assert_eq!(a.add(&b), b.add(&a));
            }
        }
        assert_eq!(
            Complexity::polynomial(4).add(&Complexity::cubic()),
            Complexity::polynomial(4)
        );
    }

    #[test]
    fn test_add_with_symbolic() {
        let sym = Complexity::symbolic("10");
        assert_eq!(sym.add(&Complexity::constant()), sym);
        assert_eq!(sym.add(&Complexity::linear()), Complexity::linear());
        assert_eq!(
            sym.add(&Complexity::symbolic("20")),
            Complexity::symbolic("10 + 20")
        );
    }

    #[test]
    fn test_multiply_constant_is_identity() {
        for c in all() {
            assert_eq!(Complexity::constant().multiply(&c), c);
            assert_eq!(c.multiply(&Complexity::constant()), c);
        }
    }

    #[test]
    fn test_multiply_table() {
        let n = Complexity::linear();
        let log = Complexity::logarithmic();

        assert_eq!(n.multiply(&n), Complexity::quadratic());
        assert_eq!(n.multiply(&Complexity::quadratic()), Complexity::cubic());
        assert_eq!(
            Complexity::cubic().multiply(&n),
            Complexity::polynomial(4)
        );
        assert_eq!(n.multiply(&log), Complexity::linearithmic());
        assert_eq!(log.multiply(&log), log);
        assert_eq!(
            Complexity::linearithmic().multiply(&n),
            Complexity::cubic()
        );
        assert_eq!(
            Complexity::quadratic().multiply(&log).to_string(),
            "O(n^3)"
        );
        assert_eq!(
            Complexity::exponential().multiply(&n),
            Complexity::exponential()
        );
    }

    #[test]
    fn test_multiply_symbolic() {
        let product = Complexity::symbolic("a + b").multiply(&Complexity::symbolic("c"));
        assert_eq!(product, Complexity::symbolic("(a + b) * c"));
        assert_eq!(
            Complexity::symbolic("c").multiply(&Complexity::linear()),
            Complexity::linear()
        );
    }
}

// crates/greeter-core/src/validation.rs
//
// Validation capabilities a request type may expose to the validation
// interceptor. A type opts in by implementing `Validatable` and reporting
// which capability it carries; the choice is fixed per type at compile time.

use crate::error::ValidationError;

/// Descriptive validation: reports the first broken rule.
pub trait StrictValidate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Cheap yes/no validity check with no reason attached.
pub trait QuickCheck {
    fn is_valid(&self) -> bool;
}

/// The capability a value exposes, in priority order.
pub enum Capability<'a> {
    Strict(&'a dyn StrictValidate),
    Quick(&'a dyn QuickCheck),
    Neither,
}

/// Closed capability interface consulted by the validation interceptor.
///
/// Types with a `StrictValidate` impl should report `Strict` even when they
/// also implement `QuickCheck`; strict validation wins.
pub trait Validatable {
    fn capability(&self) -> Capability<'_>;
}

/// Outcome of running whichever capability a value exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    /// Strict validation failed with a reason.
    Invalid(ValidationError),
    /// Quick check returned false.
    Rejected,
    /// No capability; nothing to check.
    Unchecked,
}

/// Evaluate a value's capability.
pub fn evaluate<T: Validatable + ?Sized>(value: &T) -> Verdict {
    match value.capability() {
        Capability::Strict(v) => match v.validate() {
            Ok(()) => Verdict::Valid,
            Err(e) => Verdict::Invalid(e),
        },
        Capability::Quick(c) => {
            if c.is_valid() {
                Verdict::Valid
            } else {
                Verdict::Rejected
            }
        }
        Capability::Neither => Verdict::Unchecked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysBad;

    impl StrictValidate for AlwaysBad {
        fn validate(&self) -> Result<(), ValidationError> {
            Err(ValidationError::Rule("nope".to_string()))
        }
    }

    impl QuickCheck for AlwaysBad {
        fn is_valid(&self) -> bool {
            true
        }
    }

    impl Validatable for AlwaysBad {
        fn capability(&self) -> Capability<'_> {
            Capability::Strict(self)
        }
    }

    struct Flag(bool);

    impl QuickCheck for Flag {
        fn is_valid(&self) -> bool {
            self.0
        }
    }

    impl Validatable for Flag {
        fn capability(&self) -> Capability<'_> {
            Capability::Quick(self)
        }
    }

    struct Opaque;

    impl Validatable for Opaque {
        fn capability(&self) -> Capability<'_> {
            Capability::Neither
        }
    }

    #[test]
    fn test_strict_takes_priority_over_quick() {
        assert_eq!(
            evaluate(&AlwaysBad),
            Verdict::Invalid(ValidationError::Rule("nope".to_string()))
        );
    }

    #[test]
    fn test_quick_check() {
        assert_eq!(evaluate(&Flag(true)), Verdict::Valid);
        assert_eq!(evaluate(&Flag(false)), Verdict::Rejected);
    }

    #[test]
    fn test_neither_is_unchecked() {
        assert_eq!(evaluate(&Opaque), Verdict::Unchecked);
    }
}

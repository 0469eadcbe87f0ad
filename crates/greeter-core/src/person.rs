// crates/greeter-core/src/person.rs
//
// Domain entities: the person being greeted and the greeting produced for them.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::validation::{Capability, QuickCheck, StrictValidate, Validatable};

/// The person to be greeted.
///
/// Construction does not validate; call `validate` or `is_valid` when needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    pub age: i64,
}

impl Person {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, age: i64) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            age,
        }
    }
}

impl StrictValidate for Person {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.first_name.is_empty() {
            return Err(ValidationError::EmptyFirstName);
        }
        if self.last_name.is_empty() {
            return Err(ValidationError::EmptyLastName);
        }
        if self.age <= 0 {
            return Err(ValidationError::NonPositiveAge);
        }
        Ok(())
    }
}

impl QuickCheck for Person {
    fn is_valid(&self) -> bool {
        !self.first_name.is_empty() && !self.last_name.is_empty() && self.age > 0
    }
}

impl Validatable for Person {
    fn capability(&self) -> Capability<'_> {
        Capability::Strict(self)
    }
}

/// A generated greeting message and the person it was generated for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Greeting {
    pub message: String,
    pub person: Person,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_person() {
        let p = Person::new("Ada", "Lovelace", 36);
        assert!(p.validate().is_ok());
        assert!(p.is_valid());
    }

    #[test]
    fn test_validation_order() {
        let p = Person::new("", "", 0);
        assert_eq!(p.validate(), Err(ValidationError::EmptyFirstName));

        let p = Person::new("Ada", "", 0);
        assert_eq!(p.validate(), Err(ValidationError::EmptyLastName));

        let p = Person::new("Ada", "Lovelace", 0);
        assert_eq!(p.validate(), Err(ValidationError::NonPositiveAge));
        assert!(!p.is_valid());
    }

    #[test]
    fn test_negative_age_rejected() {
        let p = Person::new("Ada", "Lovelace", -3);
        assert_eq!(
            p.validate().unwrap_err().to_string(),
            "age must be a positive number"
        );
    }
}

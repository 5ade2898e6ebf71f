use std::{fmt::Display, str::FromStr};

use garde::Validate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Validate, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[garde(transparent)]
#[serde(try_from = "String")]
pub struct ValidEmail(#[garde(email)] String);

impl FromStr for ValidEmail {
    type Err = garde::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let email = ValidEmail(s.trim().to_lowercase());
        email.validate()?;
        Ok(email)
    }
}

impl TryFrom<String> for ValidEmail {
    type Error = garde::Report;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl AsRef<str> for ValidEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for ValidEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use fake::Fake as _;
    use quickcheck::Arbitrary;
    use quickcheck_macros::quickcheck;

    use super::*;

    impl Arbitrary for ValidEmail {
        fn arbitrary(_g: &mut quickcheck::Gen) -> Self {
            let email: String = fake::faker::internet::en::SafeEmail().fake();
            ValidEmail(email)
        }
    }

    #[quickcheck]
    fn test_generated_email_parses(valid_email: ValidEmail) -> bool {
        valid_email.as_ref().parse::<ValidEmail>().is_ok()
    }

    #[test]
    fn test_email_normalized() {
        let email = ValidEmail::from_str(" Reader@Library.org ").unwrap();
        assert_eq!(email.as_ref(), "reader@library.org");
        assert_eq!(email.to_string(), "reader@library.org");
    }

    #[test]
    fn test_invalid_email() {
        assert!(ValidEmail::from_str("reader").is_err());

        let email = ValidEmail("reader".to_string());
        assert!(email.validate().is_err());
    }
}

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use strum::{EnumIter, IntoEnumIterator};

/// SEC form types with dedicated parsing/chunking support. Anything else
/// lands in `Other` and is handled with the 10-K rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
#[serde(try_from = "String")]
pub enum FormType {
    Form10K,
    Form10Q,
    Form8K,
    Other(String),
}

impl TryFrom<String> for FormType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        FormType::from_str(&s)
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormType::Form10K => write!(f, "10-K"),
            FormType::Form10Q => write!(f, "10-Q"),
            FormType::Form8K => write!(f, "8-K"),
            FormType::Other(s) => write!(f, "{}", s),
        }
    }
}

impl FromStr for FormType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<FormType, String> {
        match s.to_uppercase().as_str() {
            "10-K" => Ok(FormType::Form10K),
            "10-Q" => Ok(FormType::Form10Q),
            "8-K" => Ok(FormType::Form8K),
            _ => Ok(FormType::Other(s.to_uppercase())),
        }
    }
}

pub static FORM_TYPES: Lazy<String> = Lazy::new(|| {
    FormType::iter()
        .filter(|t| !matches!(t, FormType::Other(_)))
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
});

impl FormType {
    pub fn list_types() -> &'static str {
        &FORM_TYPES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_type_round_trip() {
        for s in ["10-K", "10-Q", "8-K"] {
            let form = FormType::from_str(s).unwrap();
            assert_eq!(form.to_string(), s);
        }
    }

    #[test]
    fn test_unknown_form_type_is_other() {
        let form = FormType::from_str("DEF 14A").unwrap();
        assert_eq!(form, FormType::Other("DEF 14A".to_string()));
        assert_eq!(form.to_string(), "DEF 14A");
    }

    #[test]
    fn test_list_types() {
        assert_eq!(FormType::list_types(), "10-K, 10-Q, 8-K");
    }
}

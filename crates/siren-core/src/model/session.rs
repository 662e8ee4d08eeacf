use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::incident::{ParseEnumError, normalize};

/// The operator signed in to the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub authenticated: bool,
    pub name: String,
    pub role: String,
}

impl User {
    /// Signed-out placeholder.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Screens the dashboard can display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    #[default]
    Dashboard,
    IncidentDetail,
    IncidentForm,
}

impl View {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::IncidentDetail => "incident-detail",
            Self::IncidentForm => "incident-form",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for View {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "dashboard" => Ok(Self::Dashboard),
            "incident-detail" | "detail" => Ok(Self::IncidentDetail),
            "incident-form" | "form" => Ok(Self::IncidentForm),
            _ => Err(ParseEnumError {
                expected: "view",
                got: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{User, View};
    use std::str::FromStr;

    #[test]
    fn anonymous_user_is_signed_out() {
        let user = User::anonymous();
        assert!(!user.authenticated);
        assert!(user.name.is_empty());
    }

    #[test]
    fn view_names_roundtrip() {
        for view in [View::Dashboard, View::IncidentDetail, View::IncidentForm] {
            assert_eq!(View::from_str(&view.to_string()).unwrap(), view);
        }
        assert_eq!(
            serde_json::to_string(&View::IncidentDetail).unwrap(),
            "\"incident-detail\""
        );
        assert!(View::from_str("map").is_err());
    }
}

// src/types/profile.rs
use serde::{Deserialize, Serialize};

/// Candidate details entered once per session and embedded into prompts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub experience_years: u32,
    pub current_role: String,
    /// One role per line.
    pub target_roles: String,
    /// Comma separated.
    pub skills: String,
}

impl UserProfile {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let profile: UserProfile = serde_json::from_str(r#"{"name":"Ada"}"#).unwrap();
        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.experience_years, 0);
        assert!(!profile.is_empty());
        assert!(UserProfile::default().is_empty());
    }
}

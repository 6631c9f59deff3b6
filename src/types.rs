//! Shared data model for the session core.
//!
//! Three layers:
//! - raw collaborator shapes (`Identity`, `ProfileRecord`)
//! - the merged, render-ready snapshot (`ResolvedSession`)
//! - view vocabulary consumed by screens (`Screen`, `MenuEntry`, `AvatarGlyph`)

use serde::{Deserialize, Serialize};

/// The authenticated principal as known to the auth provider.
///
/// `metadata` is whatever bag the provider stored at sign-up; name fields may
/// be present under several spellings or not at all. Probe it with
/// [`Identity::metadata_str`] rather than indexing directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Identity {
    /// First non-empty string found under any of `keys` in the metadata bag.
    ///
    /// Sign-up forms and OAuth providers disagree on key spelling, so callers
    /// pass alias lists like `["full_name", "fullName"]`.
    pub fn metadata_str(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| {
            self.metadata
                .get(*key)
                .and_then(|value| value.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
        })
    }
}

/// Subscription plan tier, ordered `Free < Gold < Diamond`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Free,
    Gold,
    Diamond,
}

impl PlanTier {
    /// Human-readable plan name for badges and the profile header.
    pub fn label(self) -> &'static str {
        match self {
            PlanTier::Free => "Free",
            PlanTier::Gold => "Gold",
            PlanTier::Diamond => "Diamond",
        }
    }
}

/// Application-owned supplementary user data, keyed by identity id.
///
/// Deserialized straight from a PostgREST `profiles` row. Every field is
/// optional and a missing row altogether is a normal state for users who
/// never synced a profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "plan")]
    pub plan_tier: Option<PlanTier>,
}

/// The merged, render-ready snapshot of identity + profile state.
///
/// Always internally consistent: every field was derived from the same
/// identity/profile pair in one merge pass, and screens treat it as an
/// immutable value. camelCase serialization matches what the shell's view
/// layer expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSession {
    pub is_authenticated: bool,
    pub display_name: String,
    pub email_for_display: String,
    /// Single uppercased character, or empty when no usable source exists.
    pub initial: String,
    pub plan_tier: PlanTier,
}

impl ResolvedSession {
    /// The signed-out snapshot. Also the state before the first refresh
    /// completes and after every sign-out.
    pub fn anonymous() -> Self {
        ResolvedSession {
            is_authenticated: false,
            display_name: "User".to_string(),
            email_for_display: String::new(),
            initial: String::new(),
            plan_tier: PlanTier::Free,
        }
    }
}

/// Navigation destinations known to the session core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Screen {
    Chat,
    Scan,
    Plans,
    Profile,
    Mission,
    Contact,
    Login,
    SignUp,
}

impl Screen {
    /// Route id as registered in the shell's navigators.
    pub fn route_name(self) -> &'static str {
        match self {
            Screen::Chat => "Chat",
            Screen::Scan => "Scan",
            Screen::Plans => "Plans",
            Screen::Profile => "Profile",
            Screen::Mission => "Mission",
            Screen::Contact => "ContactScreen",
            Screen::Login => "LoginScreen",
            Screen::SignUp => "SignUpScreen",
        }
    }
}

/// Entries the profile dropdown can show. Which subset appears, and in what
/// order, is decided by [`crate::gate::menu_entries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MenuEntry {
    Login,
    SignUp,
    Profile,
    Logout,
}

impl MenuEntry {
    pub fn label(self) -> &'static str {
        match self {
            MenuEntry::Login => "Login",
            MenuEntry::SignUp => "Sign Up",
            MenuEntry::Profile => "Profile",
            MenuEntry::Logout => "Logout",
        }
    }
}

/// What the avatar button should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarGlyph {
    /// Uppercased first letter of the display name.
    Initial(char),
    /// Generic person icon; used whenever no initial can be derived.
    PersonIcon,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_str_probes_aliases_in_order() {
        let mut metadata = serde_json::Map::new();
        metadata.insert("fullName".into(), serde_json::json!("Ada Wong"));
        let identity = Identity {
            id: "u1".into(),
            email: None,
            metadata,
        };
        assert_eq!(
            identity.metadata_str(&["full_name", "fullName"]),
            Some("Ada Wong")
        );
        assert_eq!(identity.metadata_str(&["first_name", "firstName"]), None);
    }

    #[test]
    fn test_metadata_str_skips_empty_and_non_string() {
        let mut metadata = serde_json::Map::new();
        metadata.insert("full_name".into(), serde_json::json!("   "));
        metadata.insert("first_name".into(), serde_json::json!(42));
        metadata.insert("firstName".into(), serde_json::json!("Ada"));
        let identity = Identity {
            id: "u1".into(),
            email: None,
            metadata,
        };
        assert_eq!(identity.metadata_str(&["full_name"]), None);
        assert_eq!(
            identity.metadata_str(&["first_name", "firstName"]),
            Some("Ada")
        );
    }

    #[test]
    fn test_plan_tier_ordering() {
        assert!(PlanTier::Free < PlanTier::Gold);
        assert!(PlanTier::Gold < PlanTier::Diamond);
        assert_eq!(PlanTier::default(), PlanTier::Free);
    }

    #[test]
    fn test_plan_tier_wire_names() {
        assert_eq!(serde_json::to_string(&PlanTier::Gold).unwrap(), "\"gold\"");
        let parsed: PlanTier = serde_json::from_str("\"diamond\"").unwrap();
        assert_eq!(parsed, PlanTier::Diamond);
    }

    #[test]
    fn test_profile_record_accepts_plan_alias() {
        let record: ProfileRecord =
            serde_json::from_str(r#"{"name":"Ada Wong","plan":"gold"}"#).unwrap();
        assert_eq!(record.plan_tier, Some(PlanTier::Gold));
    }

    #[test]
    fn test_profile_record_all_fields_optional() {
        let record: ProfileRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record, ProfileRecord::default());
    }

    #[test]
    fn test_anonymous_session_defaults() {
        let session = ResolvedSession::anonymous();
        assert!(!session.is_authenticated);
        assert_eq!(session.display_name, "User");
        assert_eq!(session.email_for_display, "");
        assert_eq!(session.initial, "");
        assert_eq!(session.plan_tier, PlanTier::Free);
    }

    #[test]
    fn test_resolved_session_serializes_camel_case() {
        let json = serde_json::to_value(ResolvedSession::anonymous()).unwrap();
        assert_eq!(json["isAuthenticated"], serde_json::json!(false));
        assert_eq!(json["displayName"], serde_json::json!("User"));
        assert_eq!(json["planTier"], serde_json::json!("free"));
    }

    #[test]
    fn test_menu_entry_labels() {
        assert_eq!(MenuEntry::Login.label(), "Login");
        assert_eq!(MenuEntry::SignUp.label(), "Sign Up");
        assert_eq!(MenuEntry::Profile.label(), "Profile");
        assert_eq!(MenuEntry::Logout.label(), "Logout");
    }

    #[test]
    fn test_screen_route_names_match_navigators() {
        assert_eq!(Screen::Login.route_name(), "LoginScreen");
        assert_eq!(Screen::SignUp.route_name(), "SignUpScreen");
        assert_eq!(Screen::Contact.route_name(), "ContactScreen");
        assert_eq!(Screen::Plans.route_name(), "Plans");
    }
}

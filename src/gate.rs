//! AuthorizationGate: pure derivations from a [`ResolvedSession`] to the
//! booleans, strings, and menu lists screens render from. No I/O, no state.

use crate::types::{AvatarGlyph, MenuEntry, PlanTier, ResolvedSession};

/// Ordered menu entries for the profile dropdown.
///
/// The order is part of the contract: anonymous sessions see Login before
/// Sign Up; authenticated sessions see Profile first and Logout last.
pub fn menu_entries(session: &ResolvedSession) -> Vec<MenuEntry> {
    if session.is_authenticated {
        vec![MenuEntry::Profile, MenuEntry::Logout]
    } else {
        vec![MenuEntry::Login, MenuEntry::SignUp]
    }
}

/// Whether a feature gated at `minimum_tier` should render for this session.
pub fn plan_gate(session: &ResolvedSession, minimum_tier: PlanTier) -> bool {
    session.plan_tier >= minimum_tier
}

/// What the avatar button renders: the session initial, or the generic
/// person icon when none could be derived.
pub fn avatar_glyph(session: &ResolvedSession) -> AvatarGlyph {
    match session.initial.chars().next() {
        Some(c) => AvatarGlyph::Initial(c),
        None => AvatarGlyph::PersonIcon,
    }
}

/// Plan badge text ("Free" / "Gold" / "Diamond").
pub fn plan_label(session: &ResolvedSession) -> &'static str {
    session.plan_tier.label()
}

/// True when picking `selected` on the plans screen must route to Login
/// instead: anonymous users cannot choose a paid tier.
pub fn plan_change_requires_login(session: &ResolvedSession, selected: PlanTier) -> bool {
    !session.is_authenticated && selected != PlanTier::Free
}

//! Profile dropdown state machine, shared by every screen's header.
//!
//! Two states, Closed and Open, recreated per screen mount. Selecting an
//! entry closes the menu first and only then performs the entry's action, so
//! a slow sign-out call can never leave the menu hanging open.

use crate::providers::NavigationHost;
use crate::store::SessionStore;
use crate::types::{MenuEntry, Screen};

/// Action produced by selecting a menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Navigate(Screen),
    SignOut,
}

#[derive(Debug, Default)]
pub struct ProfileMenu {
    open: bool,
}

impl ProfileMenu {
    /// New menu, Closed.
    pub fn new() -> Self {
        ProfileMenu::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Menu-button activation.
    pub fn open(&mut self) {
        self.open = true;
    }

    /// Outside-tap / dismiss. Closes with no action.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Select `entry`: transitions to Closed immediately and returns the
    /// action the caller must now perform.
    pub fn select(&mut self, entry: MenuEntry) -> MenuAction {
        self.open = false;
        match entry {
            MenuEntry::Login => MenuAction::Navigate(Screen::Login),
            MenuEntry::SignUp => MenuAction::Navigate(Screen::SignUp),
            MenuEntry::Profile => MenuAction::Navigate(Screen::Profile),
            MenuEntry::Logout => MenuAction::SignOut,
        }
    }
}

/// Execute a menu selection end to end.
///
/// Causal order for Logout: the menu is already Closed when `select`
/// returns (optimistic, before any network), then the sign-out call is
/// awaited, and `SessionStore::sign_out` itself navigates to Login once the
/// provider call has settled. Other entries navigate directly.
pub async fn perform_selection(
    menu: &mut ProfileMenu,
    entry: MenuEntry,
    store: &SessionStore,
    nav: &dyn NavigationHost,
) {
    match menu.select(entry) {
        MenuAction::SignOut => store.sign_out().await,
        MenuAction::Navigate(screen) => nav.navigate_to(screen),
    }
}

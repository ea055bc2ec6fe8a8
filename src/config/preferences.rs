//! User toggles read by the feeds.

use std::collections::HashMap;

use serde::Deserialize;

/// Whether sponsored photos stay in the new-photos feed.
pub const SHOW_SPONSORSHIP: &str = "show_sponsorship";

/// Read access to boolean settings.
pub trait Preferences {
    fn get_bool(&self, key: &str, default: bool) -> bool;
}

/// The `[preferences]` table of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct PreferenceTable(HashMap<String, bool>);

impl PreferenceTable {
    pub fn set(&mut self, key: impl Into<String>, value: bool) {
        self.0.insert(key.into(), value);
    }
}

impl FromIterator<(String, bool)> for PreferenceTable {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Preferences for PreferenceTable {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.0.get(key).copied().unwrap_or(default)
    }
}

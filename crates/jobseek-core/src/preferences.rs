use std::sync::Arc;

use crate::models::{CoreError, CoreErrorKind, ThemePreference};
use crate::persistence::{DARK_MODE_SLOT, KeyValueStore, PersistenceResult};

/// Theme flag persisted as a JSON boolean, independent of search history.
pub struct ThemePreferences {
    store: Arc<dyn KeyValueStore>,
    current: ThemePreference,
}

impl ThemePreferences {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let current = match store.get(DARK_MODE_SLOT) {
            Ok(Some(raw)) => match serde_json::from_slice::<bool>(&raw) {
                Ok(dark_mode) => ThemePreference::from_dark_mode(dark_mode),
                Err(error) => {
                    tracing::warn!(error = %error, "ignoring unreadable theme preference");
                    ThemePreference::default()
                }
            },
            Ok(None) => ThemePreference::default(),
            Err(error) => {
                tracing::warn!(
                    kind = ?error.kind,
                    message = %error.message,
                    "failed to read theme preference"
                );
                ThemePreference::default()
            }
        };

        Self { store, current }
    }

    pub fn current(&self) -> ThemePreference {
        self.current
    }

    pub fn set(&mut self, theme: ThemePreference) -> PersistenceResult<()> {
        self.current = theme;
        let encoded = serde_json::to_vec(&theme.is_dark()).map_err(|error| CoreError {
            kind: CoreErrorKind::Internal,
            message: format!("failed to serialize theme preference: {error}"),
        })?;
        self.store.set(DARK_MODE_SLOT, &encoded)
    }

    pub fn toggle(&mut self) -> PersistenceResult<ThemePreference> {
        let next = self.current.toggled();
        self.set(next)?;
        Ok(next)
    }
}

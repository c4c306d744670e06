//! Navigation side of the session gate

use std::sync::Mutex;

/// Moves the user to another view.
///
/// In a browser this replaces the current location; the CLI records the
/// destination so the front end can tell the user where they ended up.
pub trait Navigator: Send + Sync {
    fn redirect(&self, path: &str);
}

/// Navigator that logs and remembers every redirect
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    history: Mutex<Vec<String>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every destination, oldest first
    pub fn redirects(&self) -> Vec<String> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    pub fn last_redirect(&self) -> Option<String> {
        self.history
            .lock()
            .ok()
            .and_then(|history| history.last().cloned())
    }
}

impl Navigator for HistoryNavigator {
    fn redirect(&self, path: &str) {
        log::info!("Redirecting to {}", path);
        match self.history.lock() {
            Ok(mut history) => history.push(path.to_string()),
            Err(_) => log::warn!("Navigation history lock poisoned, dropping redirect to {}", path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_order() {
        let navigator = HistoryNavigator::new();
        assert!(navigator.last_redirect().is_none());

        navigator.redirect("/");
        navigator.redirect("/auth/callback");

        assert_eq!(navigator.redirects(), vec!["/", "/auth/callback"]);
        assert_eq!(navigator.last_redirect().as_deref(), Some("/auth/callback"));
    }
}

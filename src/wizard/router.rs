//! Router seam for the instruction wizard.

use std::sync::Mutex;

/// The host router, as the wizard sees it.
pub trait Navigator: Send + Sync {
    /// Raw value of the phase route parameter, if the route has one.
    fn current_param(&self) -> Option<String>;

    fn navigate(&self, path: &str);
}

/// In-process router: the current path plus every navigation made.
///
/// The phase parameter is the last non-empty path segment.
#[derive(Debug, Default)]
pub struct MemoryNavigator {
    inner: Mutex<NavState>,
}

#[derive(Debug, Default)]
struct NavState {
    path: String,
    history: Vec<String>,
}

impl MemoryNavigator {
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(NavState {
                path: path.into(),
                history: Vec::new(),
            }),
        }
    }

    pub fn path(&self) -> String {
        self.with_state(|s| s.path.clone())
    }

    /// Most recent navigation target, if any navigation happened.
    pub fn last_navigation(&self) -> Option<String> {
        self.with_state(|s| s.history.last().cloned())
    }

    pub fn history(&self) -> Vec<String> {
        self.with_state(|s| s.history.clone())
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut NavState) -> T) -> T {
        match self.inner.lock() {
            Ok(mut guard) => f(&mut *guard),
            Err(poisoned) => f(&mut *poisoned.into_inner()),
        }
    }
}

impl Navigator for MemoryNavigator {
    fn current_param(&self) -> Option<String> {
        self.with_state(|s| {
            s.path
                .rsplit('/')
                .find(|seg| !seg.is_empty())
                .map(str::to_string)
        })
    }

    fn navigate(&self, path: &str) {
        self.with_state(|s| {
            s.path = path.to_string();
            s.history.push(path.to_string());
        });
    }
}

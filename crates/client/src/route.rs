//! Views of the application and which of them need a session.

/// A navigable view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Login form, the entry point
    Login,
    Register,
    /// Protected landing page after authentication
    Dashboard,
}

impl Route {
    /// Path of the view
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
        }
    }

    /// Whether showing this view requires a session token
    pub fn is_protected(self) -> bool {
        matches!(self, Route::Dashboard)
    }

    /// Look a view up by its path
    pub fn from_path(path: &str) -> Option<Self> {
        [Route::Login, Route::Register, Route::Dashboard]
            .into_iter()
            .find(|route| route.path() == path)
    }
}

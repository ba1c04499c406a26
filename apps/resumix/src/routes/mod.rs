//! Client-side route table and the authorization gate in front of every view.

use std::fmt;

use crate::models::user::Role;
use crate::session::Session;

/// Where the guard sends unauthenticated callers.
pub const LOGIN: Route = Route::Login;
/// Where the guard sends authenticated callers it won't let through.
pub const DEFAULT_HOME: Route = Route::Dashboard;

/// Redirect chains are at most unknown -> dashboard -> login.
const MAX_REDIRECTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Upload,
    Dashboard,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Role(Role),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectTo(Route),
}

impl Route {
    pub const ALL: [Route; 5] = [
        Route::Login,
        Route::Register,
        Route::Upload,
        Route::Dashboard,
        Route::Admin,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Upload => "/upload",
            Route::Dashboard => "/dashboard",
            Route::Admin => "/admin",
        }
    }

    /// Matches a path with or without a trailing slash.
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim();
        let normalized = match trimmed.trim_end_matches('/') {
            "" => return None,
            p if p.starts_with('/') => p.to_string(),
            p => format!("/{p}"),
        };
        Route::ALL.into_iter().find(|r| r.path() == normalized)
    }

    pub fn access(&self) -> Access {
        match self {
            Route::Login | Route::Register => Access::Public,
            Route::Upload | Route::Dashboard => Access::Authenticated,
            Route::Admin => Access::Role(Role::Admin),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Decides whether `route` may be shown for `session`.
/// `None` stands for a path that matched no route.
pub fn authorize(route: Option<Route>, session: &Session) -> Decision {
    let Some(route) = route else {
        return Decision::RedirectTo(DEFAULT_HOME);
    };
    match route.access() {
        Access::Public => Decision::Allow,
        Access::Authenticated if !session.is_authenticated() => Decision::RedirectTo(LOGIN),
        Access::Authenticated => Decision::Allow,
        Access::Role(_) if !session.is_authenticated() => Decision::RedirectTo(LOGIN),
        Access::Role(required) if session.role() != Some(required) => {
            Decision::RedirectTo(DEFAULT_HOME)
        }
        Access::Role(_) => Decision::Allow,
    }
}

pub fn authorize_path(path: &str, session: &Session) -> Decision {
    authorize(Route::from_path(path), session)
}

/// Follows redirects from `path` until a route is allowed.
pub fn resolve(path: &str, session: &Session) -> Route {
    let mut requested = Route::from_path(path);
    for _ in 0..MAX_REDIRECTS {
        match (authorize(requested, session), requested) {
            (Decision::Allow, Some(route)) => return route,
            (Decision::RedirectTo(target), _) => requested = Some(target),
            (Decision::Allow, None) => break,
        }
    }
    LOGIN
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavLink {
    Upload,
    Dashboard,
    Admin,
    Login,
    Register,
    Logout,
}

impl NavLink {
    pub fn label(&self) -> &'static str {
        match self {
            NavLink::Upload => "Upload",
            NavLink::Dashboard => "Dashboard",
            NavLink::Admin => "Admin",
            NavLink::Login => "Login",
            NavLink::Register => "Register",
            NavLink::Logout => "Logout",
        }
    }
}

/// Navigation entries offered for the current session, in display order.
pub fn nav_links(session: &Session) -> Vec<NavLink> {
    if !session.is_authenticated() {
        return vec![NavLink::Login, NavLink::Register];
    }
    let mut links = vec![NavLink::Upload, NavLink::Dashboard];
    if session.role() == Some(Role::Admin) {
        links.push(NavLink::Admin);
    }
    links.push(NavLink::Logout);
    links
}

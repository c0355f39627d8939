use crate::services::auth::Session;

/// Screens of the admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Products,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Products => "/products",
        }
    }
}

/// Resolves a requested path to the route actually shown.
///
/// `/` and unknown paths land on the login screen; the products screen
/// requires an authenticated session.
pub fn guard(path: &str, session: &Session) -> Route {
    let normalized = path.trim_end_matches('/');
    match normalized {
        "/products" if session.is_authenticated() => Route::Products,
        "/products" => {
            tracing::info!("Unauthenticated access to /products, redirecting to /login");
            Route::Login
        }
        _ => Route::Login,
    }
}

use crate::api::error::AppResult;
use crate::middleware::auth::{Route, guard};
use crate::services::auth::{Authenticator, Session};
use crate::services::notifier::Notifier;

/// Login screen submit.
///
/// Success marks the session authenticated and lands on `/products`;
/// failure leaves the session logged out and the operator on `/login`.
/// Either way exactly one notice is published.
pub async fn login(
    session: &mut Session,
    authenticator: &dyn Authenticator,
    notifier: &Notifier,
    username: &str,
    password: &str,
) -> AppResult<Route> {
    match session.login(authenticator, username, password).await {
        Ok(()) => {
            notifier.success("Login successful!");
            Ok(guard(Route::Products.path(), session))
        }
        Err(e) => {
            tracing::warn!("Login failed for '{}': {}", username, e);
            notifier.error("Invalid credentials");
            Err(e)
        }
    }
}

pub fn logout(session: &mut Session, notifier: &Notifier) -> Route {
    session.logout();
    notifier.success("Logged out");
    guard(Route::Login.path(), session)
}

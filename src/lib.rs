pub mod api;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use crate::api::client::{HttpProductApi, ProductApi};
use crate::api::error::{AppError, AppResult};
use crate::config::ClientConfig;
use crate::handlers::products_page::ProductsPage;
use crate::middleware::auth::{Route, guard};
use crate::services::auth::{Authenticator, ConfiguredAuthenticator, Session};
use crate::services::notifier::{Notice, Notifier};
use crate::services::preview::PreviewRegistry;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Shared services handed to every screen.
#[derive(Clone)]
pub struct AppState {
    pub config: ClientConfig,
    pub api: Arc<dyn ProductApi>,
    pub authenticator: Arc<dyn Authenticator>,
    pub notifier: Notifier,
    pub previews: PreviewRegistry,
}

impl AppState {
    pub fn from_config(config: ClientConfig) -> AppResult<Self> {
        let api = HttpProductApi::new(&config)?;
        let authenticator = ConfiguredAuthenticator::from_config(&config);
        Ok(Self {
            api: Arc::new(api),
            authenticator: Arc::new(authenticator),
            notifier: Notifier::default(),
            previews: PreviewRegistry::new(),
            config,
        })
    }
}

/// The running admin: shared state plus the session and current route.
pub struct App {
    state: AppState,
    session: Session,
    route: Route,
}

pub fn create_app(state: AppState) -> App {
    App {
        state,
        session: Session::new(),
        route: Route::Login,
    }
}

impl App {
    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.state.notifier.subscribe()
    }

    /// Moves to `path`, subject to the route guard.
    pub fn navigate(&mut self, path: &str) -> Route {
        self.route = guard(path, &self.session);
        self.route
    }

    pub async fn login(&mut self, username: &str, password: &str) -> AppResult<Route> {
        let result = handlers::auth::login(
            &mut self.session,
            self.state.authenticator.as_ref(),
            &self.state.notifier,
            username,
            password,
        )
        .await;
        self.route = match &result {
            Ok(route) => *route,
            Err(_) => Route::Login,
        };
        result
    }

    pub fn logout(&mut self) -> Route {
        self.route = handlers::auth::logout(&mut self.session, &self.state.notifier);
        self.route
    }

    /// The products screen. Only reachable with an authenticated session.
    pub fn products_page(&mut self) -> AppResult<ProductsPage> {
        if self.navigate(Route::Products.path()) != Route::Products {
            return Err(AppError::Unauthorized("Login required".to_string()));
        }
        Ok(ProductsPage::new(
            Arc::clone(&self.state.api),
            self.state.notifier.clone(),
            self.state.previews.clone(),
            self.state.config.gallery_limit,
        ))
    }
}

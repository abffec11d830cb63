pub mod store;

use log::{info, warn};
use thiserror::Error;

use crate::api::{ApiError, Credentials, CustomerApi};
pub use store::{FileTokenStore, MemoryTokenStore, StoreError, TokenStore, TOKEN_KEY};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Login,
    Main,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no valid session token; login required")]
    AuthMissing,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("{message}")]
    Rejected { message: String },

    #[error("Something went wrong")]
    Transport {
        #[source]
        source: ApiError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A usable token is non-empty and free of whitespace and control characters.
pub fn is_well_formed(token: &str) -> bool {
    !token.is_empty() && !token.chars().any(|c| c.is_whitespace() || c.is_control())
}

/// Single owner of the bearer token and of the login/main view switch.
///
/// `epoch` moves forward every time the session ends, so callers can tell
/// whether work they started still belongs to the live session.
#[derive(Debug)]
pub struct SessionGate<S: TokenStore> {
    store: S,
    view: View,
    epoch: u64,
}

impl<S: TokenStore> SessionGate<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            view: View::Login,
            epoch: 0,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn get_token(&self) -> Result<Option<String>, SessionError> {
        Ok(self.store.load()?)
    }

    /// Returns the live token, or moves to the login view and fails.
    pub fn require_session(&mut self) -> Result<String, SessionError> {
        let token = match self.store.load() {
            Ok(token) => token,
            Err(e) => {
                warn!("could not read session token: {e}");
                None
            }
        };
        match token {
            Some(token) if is_well_formed(&token) => {
                self.view = View::Main;
                Ok(token)
            }
            Some(_) => {
                warn!("Invalid or missing token");
                self.redirect_to_login();
                Err(SessionError::AuthMissing)
            }
            None => {
                self.redirect_to_login();
                Err(SessionError::AuthMissing)
            }
        }
    }

    pub async fn login<A>(&mut self, api: &A, credentials: &Credentials) -> Result<String, LoginError>
    where
        A: CustomerApi + ?Sized,
    {
        match api.login(credentials).await {
            Ok(token) => {
                self.store.save(&token)?;
                self.view = View::Main;
                info!("logged in as {}", credentials.email);
                Ok(token)
            }
            Err(ApiError::LoginRejected { message }) => {
                self.view = View::Login;
                Err(LoginError::Rejected { message })
            }
            Err(source) => {
                warn!("Login error: {source}");
                self.view = View::Login;
                Err(LoginError::Transport { source })
            }
        }
    }

    pub fn logout(&mut self) -> Result<(), SessionError> {
        let cleared = self.store.clear();
        self.redirect_to_login();
        info!("logged out");
        cleared?;
        Ok(())
    }

    /// Called when the API rejects the token (401/403): the token is dropped
    /// and the login view shown.
    pub fn invalidate(&mut self) -> Result<(), SessionError> {
        let cleared = self.store.clear();
        self.redirect_to_login();
        cleared?;
        Ok(())
    }

    pub fn redirect_to_login(&mut self) {
        if self.view != View::Login {
            info!("redirecting to login");
        }
        self.view = View::Login;
        self.epoch += 1;
    }
}

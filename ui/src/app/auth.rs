use super::lifecycle::SessionContext;
use crate::error::{AppError, AppResult};
use crate::validation::{EmailValidator, PasswordValidator, Validator};
use engine::catalog::{AccountService, CatalogError, Credentials, StoredSession};
use engine::session::SessionStore;
use std::sync::Arc;

/// Sign-in, sign-up, recovery and sign-out against the account backend.
///
/// The signed-in identity is persisted through the [`SessionStore`] and handed
/// to the rest of the app as a [`SessionContext`].
pub struct AuthFlow {
    account: Arc<dyn AccountService>,
    store: SessionStore,
}

impl AuthFlow {
    pub fn new(account: Arc<dyn AccountService>, store: SessionStore) -> Self {
        Self { account, store }
    }

    /// The session saved by a previous sign-in, without contacting the backend
    pub async fn restore(store: &SessionStore) -> SessionContext {
        match store.load().await {
            Some(stored) => SessionContext::signed_in(stored.identity),
            None => SessionContext::anonymous(),
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<SessionContext> {
        EmailValidator.validate(email)?;
        if password.is_empty() {
            return Err(AppError::Auth("Password cannot be empty".to_string()));
        }

        let credentials = Credentials::new(email.trim(), password);
        let session = self
            .account
            .create_session(&credentials)
            .await
            .map_err(auth_error)?;
        let identity = self
            .account
            .current_user(&session)
            .await
            .map_err(auth_error)?;

        let stored = StoredSession {
            session,
            identity: identity.clone(),
        };
        if let Err(e) = self.store.save(&stored).await {
            log::warn!("Signed in but failed to save the session: {e}");
        }

        log::info!("Signed in as {}", identity.email);
        Ok(SessionContext::signed_in(identity))
    }

    /// Creates an account, then signs in with it.
    pub async fn sign_up(
        &self,
        name: Option<&str>,
        email: &str,
        password: &str,
    ) -> AppResult<SessionContext> {
        EmailValidator.validate(email)?;
        PasswordValidator.validate(password)?;

        let credentials = Credentials::new(email.trim(), password);
        self.account
            .create_account(name, &credentials)
            .await
            .map_err(auth_error)?;
        log::info!("Created account for {}", credentials.email);

        self.sign_in(email, password).await
    }

    pub async fn request_recovery(&self, email: &str) -> AppResult<()> {
        EmailValidator.validate(email)?;
        self.account
            .request_recovery(email.trim())
            .await
            .map_err(auth_error)
    }

    /// Ends the saved session. The local session is cleared even when the
    /// backend cannot be reached.
    pub async fn sign_out(&self) -> AppResult<SessionContext> {
        if let Some(stored) = self.store.load().await {
            if let Err(e) = self.account.delete_session(&stored.session).await {
                log::warn!("Failed to end the session remotely: {e}");
            }
        }

        self.store
            .clear()
            .await
            .map_err(|e| AppError::Io(format!("Failed to remove the saved session: {e}")))?;
        Ok(SessionContext::anonymous())
    }
}

fn auth_error(error: CatalogError) -> AppError {
    match error {
        CatalogError::Status { status: 401, .. } => {
            AppError::Auth("Invalid email or password".to_string())
        }
        CatalogError::Status { status: 409, .. } => {
            AppError::Auth("An account with this email already exists".to_string())
        }
        CatalogError::Status { status: 429, .. } => {
            AppError::Auth("Too many attempts. Please wait and try again".to_string())
        }
        other => AppError::Catalog(other),
    }
}

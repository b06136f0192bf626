use accounts_common::{AccountId, AuthResponse, LoginRequest, RegisterRequest};
use async_trait::async_trait;
use chrono::Utc;
use metrics::counter;
use tokio::sync::OnceCell;
use tracing::{info, instrument, warn};
use zeroize::Zeroize;

use super::password::{hash_password, hash_password_secure, verify_password, HashScheme};
use super::token::TokenIssuer;
use super::AuthService;
use crate::error::AppError;
use crate::metrics as keys;
use crate::storage::{Account, CredentialStore, NewAccount, StoreError};
use crate::validation::{validate_registration, ValidRegistration, MAX_EMAIL_LENGTH};

/// Hashed in place of a real one when the email is unknown, so both
/// login failure paths do the same amount of work.
const TIMING_DUMMY_PASSWORD: &str = "timing-equalisation-placeholder";

/// [`AuthService`] backed by a [`CredentialStore`]
pub struct DefaultAuth<S> {
    store: S,
    tokens: TokenIssuer,
    scheme: HashScheme,
    dummy_hash: OnceCell<String>,
}

impl<S: CredentialStore> DefaultAuth<S> {
    pub fn new(store: S, tokens: TokenIssuer, scheme: HashScheme) -> Self {
        Self {
            store,
            tokens,
            scheme,
            dummy_hash: OnceCell::new(),
        }
    }

    /// Compute the timing dummy hash ahead of the first login
    pub async fn warm_up(&self) -> Result<(), AppError> {
        self.dummy_hash().await.map(|_| ())
    }

    async fn dummy_hash(&self) -> Result<&str, AppError> {
        let scheme = self.scheme;
        self.dummy_hash
            .get_or_try_init(|| async move {
                let hash = tokio::task::spawn_blocking(move || {
                    hash_password(TIMING_DUMMY_PASSWORD, scheme)
                })
                .await??;
                Ok::<_, AppError>(hash)
            })
            .await
            .map(String::as_str)
    }

    /// Hash on the blocking pool; the raw password is zeroized afterwards.
    async fn hash(&self, mut password: String) -> Result<String, AppError> {
        let scheme = self.scheme;
        let hash =
            tokio::task::spawn_blocking(move || hash_password_secure(&mut password, scheme))
                .await??;
        Ok(hash)
    }

    async fn check_password(hash: String, mut password: String) -> Result<bool, AppError> {
        let matched = tokio::task::spawn_blocking(move || {
            let matched = verify_password(&hash, &password);
            password.zeroize();
            matched
        })
        .await?;
        Ok(matched)
    }

    fn respond(&self, account: &Account) -> Result<AuthResponse, AppError> {
        let token = self.tokens.issue(account.id, Utc::now())?;
        Ok(AuthResponse {
            token,
            user: account.profile(),
        })
    }

    async fn try_register(&self, req: RegisterRequest) -> Result<AuthResponse, AppError> {
        let ValidRegistration {
            name,
            date_of_birth,
            email,
            password,
        } = validate_registration(req, Utc::now().date_naive())?;

        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AppError::AccountExists);
        }

        let password_hash = self.hash(password).await?;

        // A concurrent registration may still win between lookup and insert;
        // the store's unique key settles it.
        let account = match self
            .store
            .create(NewAccount {
                name,
                date_of_birth,
                email,
                password_hash,
            })
            .await
        {
            Ok(account) => account,
            Err(StoreError::DuplicateKey(_)) => return Err(AppError::AccountExists),
            Err(e) => return Err(e.into()),
        };

        info!(account_id = %account.id, "account registered");
        self.respond(&account)
    }

    async fn try_login(&self, req: LoginRequest) -> Result<AuthResponse, AppError> {
        let LoginRequest { email, password } = req;
        let email = email.trim();
        let has_password = !password.is_empty();

        // An email registration would refuse cannot name an account; it
        // still pays for a verification like every other failure.
        let account = if email.is_empty() || email.len() > MAX_EMAIL_LENGTH {
            None
        } else {
            self.store.find_by_email(email).await?
        };
        let hash = match &account {
            Some(account) => account.password_hash.clone(),
            None => self.dummy_hash().await?.to_string(),
        };
        let matched = Self::check_password(hash, password).await?;

        match account {
            Some(account) if matched && has_password => {
                info!(account_id = %account.id, "login succeeded");
                self.respond(&account)
            },
            _ => Err(AppError::InvalidCredentials),
        }
    }
}

#[async_trait]
impl<S: CredentialStore> AuthService for DefaultAuth<S> {
    #[instrument(skip_all, fields(email = %req.email))]
    async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, AppError> {
        let result = self.try_register(req).await;
        match &result {
            Ok(_) => counter!(keys::REGISTER_SUCCESS).increment(1),
            Err(e) => {
                counter!(keys::REGISTER_FAILURE).increment(1);
                warn!(code = e.error_code(), "registration rejected");
            },
        }
        result
    }

    #[instrument(skip_all, fields(email = %req.email))]
    async fn login(&self, req: LoginRequest) -> Result<AuthResponse, AppError> {
        let result = self.try_login(req).await;
        match &result {
            Ok(_) => counter!(keys::LOGIN_SUCCESS).increment(1),
            Err(e) => {
                counter!(keys::LOGIN_FAILURE).increment(1);
                warn!(code = e.error_code(), "login rejected");
            },
        }
        result
    }

    fn verify(&self, token: &str) -> Result<AccountId, AppError> {
        self.tokens
            .verify(token, Utc::now())
            .map(|claims| claims.sub)
            .map_err(|e| {
                counter!(keys::TOKEN_REJECTED).increment(1);
                AppError::from(e)
            })
    }
}

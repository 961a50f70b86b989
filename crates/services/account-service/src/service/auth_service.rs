//! Authentication service - login and password recovery.
//!
//! Credentials are checked against the active account only. Every failure of
//! the login path yields the same error, and the unknown-email path still
//! pays for a hash verification.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{Account, Password, PasswordRecovery};

use crate::infra::RecoveryNotifier;
use crate::repository::{AccountRepository, RecoveryRepository};
use crate::service::token::{TokenIssuer, TokenResponse};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Authentication service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Verify email and secret, then issue a token
    async fn login(&self, email: &str, password: &str) -> AppResult<TokenResponse>;

    /// Issue a recovery code. Unknown emails succeed without doing anything.
    async fn send_recovery_code(&self, email: &str) -> AppResult<()>;

    /// Exchange a valid recovery code for a reset token
    async fn verify_recovery_code(&self, email: &str, code: &str) -> AppResult<String>;

    /// Set a new secret using the reset token
    async fn reset_password(&self, email: &str, token: &str, new_password: &str) -> AppResult<()>;
}

/// Concrete implementation of AuthService over the account and recovery stores.
pub struct Authenticator {
    accounts: Arc<dyn AccountRepository>,
    recoveries: Arc<dyn RecoveryRepository>,
    notifier: Arc<dyn RecoveryNotifier>,
    tokens: TokenIssuer,
    recovery_ttl: Duration,
    /// Verified against when no account matches, to equalize timing
    dummy_hash: Password,
}

impl Authenticator {
    /// Create new auth service instance.
    ///
    /// Hashes a random throwaway secret once, so the unknown-email path
    /// verifies against a real Argon2 hash with production parameters.
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        recoveries: Arc<dyn RecoveryRepository>,
        notifier: Arc<dyn RecoveryNotifier>,
        tokens: TokenIssuer,
        recovery_ttl: Duration,
    ) -> AppResult<Self> {
        let dummy_hash = Password::hash_secret(&Uuid::new_v4().to_string())?;

        Ok(Self {
            accounts,
            recoveries,
            notifier,
            tokens,
            recovery_ttl,
            dummy_hash,
        })
    }

    async fn pending_recovery(&self, email: &str) -> AppResult<(Account, PasswordRecovery)> {
        let account = self
            .accounts
            .find_active_by_email(email)
            .await?
            .ok_or(AppError::InvalidRecovery)?;

        let recovery = self
            .recoveries
            .find_by_account(account.id)
            .await?
            .ok_or(AppError::InvalidRecovery)?;

        Ok((account, recovery))
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn login(&self, email: &str, password: &str) -> AppResult<TokenResponse> {
        let account = self.accounts.find_active_by_email(email).await?;

        let stored = account
            .as_ref()
            .map(|a| &a.password)
            .unwrap_or(&self.dummy_hash);
        let password_valid = stored.verify(password);

        match account {
            Some(account) if password_valid => {
                info!(account_id = %account.id, "Login succeeded");
                self.tokens.issue(&account)
            }
            _ => {
                warn!("Login failed");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    async fn send_recovery_code(&self, email: &str) -> AppResult<()> {
        let Some(account) = self.accounts.find_active_by_email(email).await? else {
            debug!("Recovery requested for an unknown email");
            return Ok(());
        };

        let (recovery, code) = PasswordRecovery::issue(account.id, Utc::now(), self.recovery_ttl)?;
        self.recoveries.save(&recovery).await?;
        self.notifier
            .send_code(&account, &code, recovery.expires_at)
            .await?;

        info!(account_id = %account.id, "Recovery code issued");
        Ok(())
    }

    async fn verify_recovery_code(&self, email: &str, code: &str) -> AppResult<String> {
        let (account, mut recovery) = self.pending_recovery(email).await?;

        let token = match recovery.redeem_code(code, Utc::now(), self.recovery_ttl) {
            Ok(token) => token,
            Err(err) => {
                if recovery.is_exhausted() {
                    warn!(account_id = %account.id, "Recovery discarded after too many wrong codes");
                    self.recoveries.delete(account.id).await?;
                } else {
                    self.recoveries.save(&recovery).await?;
                }
                return Err(err.into());
            }
        };
        self.recoveries.save(&recovery).await?;

        info!(account_id = %account.id, "Recovery code verified");
        Ok(token)
    }

    async fn reset_password(&self, email: &str, token: &str, new_password: &str) -> AppResult<()> {
        let (mut account, recovery) = self.pending_recovery(email).await?;
        let now = Utc::now();

        recovery.check_token(token, now)?;
        let password = Password::new(new_password)?;

        account.set_password(password, now);
        self.accounts.update(&account).await?;
        self.recoveries.delete(account.id).await?;

        info!(account_id = %account.id, "Password reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use domain::{Cpf, NewAccountProfile, RoleSet, MAX_RECOVERY_ATTEMPTS, ROLE_USER};

    use crate::infra::MockRecoveryNotifier;
    use crate::repository::{MockAccountRepository, MockRecoveryRepository};

    const PRIVATE_KEY: &str = include_str!("../../tests/fixtures/private_key.pem");

    fn account_with_password(plain: &str) -> Account {
        let profile = NewAccountProfile {
            cpf: Cpf::parse("52998224725").unwrap(),
            full_name: "Maria Silva".to_string(),
            email: "maria@example.com".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
        };
        Account::register(
            Uuid::new_v4(),
            profile,
            Password::new(plain).unwrap(),
            [ROLE_USER].into_iter().collect::<RoleSet>(),
            Utc::now(),
        )
    }

    fn authenticator(
        accounts: MockAccountRepository,
        recoveries: MockRecoveryRepository,
        notifier: MockRecoveryNotifier,
    ) -> Authenticator {
        Authenticator::new(
            Arc::new(accounts),
            Arc::new(recoveries),
            Arc::new(notifier),
            TokenIssuer::from_pem(PRIVATE_KEY, 3_600_000).unwrap(),
            Duration::minutes(15),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_login_success() {
        let account = account_with_password("correct horse");
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_active_by_email()
            .withf(|email| email == "maria@example.com")
            .returning(move |_| Ok(Some(account.clone())));

        let auth = authenticator(accounts, MockRecoveryRepository::new(), MockRecoveryNotifier::new());
        let response = auth.login("maria@example.com", "correct horse").await.unwrap();

        assert_eq!(response.token_type, "Bearer");
        assert!(!response.access_token.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_fail_alike() {
        let account = account_with_password("correct horse");
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_active_by_email()
            .returning(move |email| {
                Ok((email == "maria@example.com").then(|| account.clone()))
            });

        let auth = authenticator(accounts, MockRecoveryRepository::new(), MockRecoveryNotifier::new());

        let wrong = auth.login("maria@example.com", "battery staple").await.unwrap_err();
        let unknown = auth.login("nobody@example.com", "correct horse").await.unwrap_err();

        assert!(matches!(wrong, AppError::InvalidCredentials));
        assert!(matches!(unknown, AppError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn test_recovery_for_unknown_email_is_silent() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_find_active_by_email().returning(|_| Ok(None));
        let mut recoveries = MockRecoveryRepository::new();
        recoveries.expect_save().times(0);
        let mut notifier = MockRecoveryNotifier::new();
        notifier.expect_send_code().times(0);

        let auth = authenticator(accounts, recoveries, notifier);
        auth.send_recovery_code("nobody@example.com").await.unwrap();
    }

    #[tokio::test]
    async fn test_recovery_code_is_stored_hashed_and_delivered() {
        let account = account_with_password("correct horse");
        let account_id = account.id;
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_active_by_email()
            .returning(move |_| Ok(Some(account.clone())));

        let mut recoveries = MockRecoveryRepository::new();
        recoveries
            .expect_save()
            .withf(move |r| r.account_id == account_id && r.reset_token.is_none())
            .times(1)
            .returning(|_| Ok(()));

        let mut notifier = MockRecoveryNotifier::new();
        notifier
            .expect_send_code()
            .withf(|_, code, _| code.len() == 6 && code.chars().all(|c| c.is_ascii_digit()))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let auth = authenticator(accounts, recoveries, notifier);
        auth.send_recovery_code("maria@example.com").await.unwrap();
    }

    #[tokio::test]
    async fn test_verify_without_pending_recovery_fails() {
        let account = account_with_password("correct horse");
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_active_by_email()
            .returning(move |_| Ok(Some(account.clone())));
        let mut recoveries = MockRecoveryRepository::new();
        recoveries.expect_find_by_account().returning(|_| Ok(None));

        let auth = authenticator(accounts, recoveries, MockRecoveryNotifier::new());
        let err = auth
            .verify_recovery_code("maria@example.com", "123456")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRecovery));
    }

    #[tokio::test]
    async fn test_reset_with_wrong_token_leaves_account_alone() {
        let account = account_with_password("correct horse");
        let account_id = account.id;
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_active_by_email()
            .returning(move |_| Ok(Some(account.clone())));
        accounts.expect_update().times(0);

        let (mut recovery, code) =
            PasswordRecovery::issue(account_id, Utc::now(), Duration::minutes(15)).unwrap();
        recovery
            .redeem_code(&code, Utc::now(), Duration::minutes(15))
            .unwrap();

        let mut recoveries = MockRecoveryRepository::new();
        recoveries
            .expect_find_by_account()
            .returning(move |_| Ok(Some(recovery.clone())));
        recoveries.expect_delete().times(0);

        let auth = authenticator(accounts, recoveries, MockRecoveryNotifier::new());
        let err = auth
            .reset_password("maria@example.com", "not-the-token", "new secret 1")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRecovery));
    }

    #[tokio::test]
    async fn test_last_wrong_code_discards_recovery() {
        let account = account_with_password("correct horse");
        let account_id = account.id;
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_active_by_email()
            .returning(move |_| Ok(Some(account.clone())));

        let (mut recovery, code) =
            PasswordRecovery::issue(account_id, Utc::now(), Duration::minutes(15)).unwrap();
        recovery.attempts = MAX_RECOVERY_ATTEMPTS - 1;
        let wrong = if code == "000000" { "111111" } else { "000000" };

        let mut recoveries = MockRecoveryRepository::new();
        recoveries
            .expect_find_by_account()
            .returning(move |_| Ok(Some(recovery.clone())));
        recoveries.expect_save().times(0);
        recoveries
            .expect_delete()
            .withf(move |id| *id == account_id)
            .times(1)
            .returning(|_| Ok(()));

        let auth = authenticator(accounts, recoveries, MockRecoveryNotifier::new());
        let err = auth
            .verify_recovery_code("maria@example.com", wrong)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRecovery));
    }
}

use chrono::{Duration, Utc};
use std::sync::Arc;
use thiserror::Error;

use crate::{util::random_string, Database, DatabaseError, NewSession, SessionData};

/// Resolves authenticated principals to stable user records.
///
/// The external identity provider verifies the email; this layer only turns
/// a verified email into a user row and a session token.
pub struct Identity<Db> {
    db: Arc<Db>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Session does not exist or has expired")]
    InvalidSession,
    /// Something else went wrong with the database
    #[error(transparent)]
    Db(DatabaseError),
}

impl<Db> Identity<Db>
where
    Db: Database,
{
    const SESSION_DURATION_IN_DAYS: usize = 7;

    pub fn new(db: &Arc<Db>) -> Self {
        Self { db: db.clone() }
    }

    /// Signs in a verified email, creating the user on first sign-in and
    /// returning a fresh session
    pub async fn login(&self, email: &str) -> Result<SessionData, AuthError> {
        self.clear_expired().await?;

        let user = self
            .db
            .upsert_user_by_email(email)
            .await
            .map_err(AuthError::Db)?;

        let expires_at = Utc::now() + Duration::days(Self::SESSION_DURATION_IN_DAYS as i64);

        let new_session = NewSession {
            token: random_string(32),
            user_id: user.id,
            expires_at,
        };

        self.db
            .create_session(new_session)
            .await
            .map_err(AuthError::Db)
    }

    /// Deletes the associated session, if it exists
    pub async fn logout(&self, token: &str) -> Result<(), DatabaseError> {
        self.db.delete_session_by_token(token).await
    }

    /// Returns the session for a token, rejecting expired ones
    pub async fn session(&self, token: &str) -> Result<SessionData, AuthError> {
        let session = self.db.session_by_token(token).await.map_err(|e| match e {
            DatabaseError::NotFound { .. } => AuthError::InvalidSession,
            e => AuthError::Db(e),
        })?;

        if session.expires_at < Utc::now() {
            return Err(AuthError::InvalidSession);
        }

        Ok(session)
    }

    async fn clear_expired(&self) -> Result<(), AuthError> {
        self.db
            .clear_expired_sessions()
            .await
            .map_err(AuthError::Db)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::MemoryDatabase;

    #[tokio::test]
    async fn test_login_creates_user_once() {
        let db = Arc::new(MemoryDatabase::default());
        let identity = Identity::new(&db);

        let first = identity.login("creator@example.com").await.expect("login");
        let second = identity.login("creator@example.com").await.expect("login");

        assert_eq!(first.user, second.user);
        assert_ne!(first.token, second.token);

        // Looking the email up resolves to the same stable user
        let resolved = db.user_by_email("creator@example.com").await.expect("lookup");
        assert_eq!(resolved, first.user);
    }

    #[tokio::test]
    async fn test_session_resolution() {
        let db = Arc::new(MemoryDatabase::default());
        let identity = Identity::new(&db);

        let session = identity.login("creator@example.com").await.expect("login");
        let resolved = identity.session(&session.token).await.expect("resolves");

        assert_eq!(resolved.user.email, "creator@example.com");

        identity.logout(&session.token).await.expect("logout");

        assert!(matches!(
            identity.session(&session.token).await,
            Err(AuthError::InvalidSession)
        ));
    }
}

//! Auth gateway contract and SQLite-backed implementation.

use crate::auth::session::{AuthEvent, OAuthRequest, Session, SignInValidationError};
use crate::clock::{Clock, SystemClock};
use crate::db::{ensure_schema_ready, DbError};
use crate::feed::listeners::{ListenerSet, Subscription};
use log::info;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-layer error.
#[derive(Debug)]
pub enum AuthError {
    Validation(SignInValidationError),
    Db(DbError),
    InvalidData(String),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid session data: {message}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<SignInValidationError> for AuthError {
    fn from(value: SignInValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for AuthError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for AuthError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Identity service contract.
pub trait AuthGateway {
    /// Current session, if signed in.
    fn get_session(&self) -> AuthResult<Option<Session>>;
    /// Signs in through an OAuth provider and returns the new session.
    fn sign_in_with_oauth(&self, request: &OAuthRequest) -> AuthResult<Session>;
    /// Ends the current session. Succeeds when already signed out.
    fn sign_out(&self) -> AuthResult<()>;
    /// Registers a listener for sign-in/sign-out events.
    fn on_auth_state_change(
        &self,
        listener: Box<dyn Fn(&AuthEvent) + Send + Sync>,
    ) -> Subscription;
}

/// SQLite-backed identity store.
///
/// Sign-in resolves `(provider, account)` to a user row, creating it on
/// first use, and replaces any existing session.
pub struct SqliteAuthGateway<'conn, C: Clock = SystemClock> {
    conn: &'conn Connection,
    clock: C,
    listeners: ListenerSet<AuthEvent>,
}

impl<'conn> SqliteAuthGateway<'conn, SystemClock> {
    pub fn try_new(conn: &'conn Connection) -> AuthResult<Self> {
        Self::with_clock(conn, SystemClock)
    }
}

impl<'conn, C: Clock> SqliteAuthGateway<'conn, C> {
    pub fn with_clock(conn: &'conn Connection, clock: C) -> AuthResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self {
            conn,
            clock,
            listeners: ListenerSet::new(),
        })
    }

    fn resolve_user(&self, provider: &str, account: &str, now_ms: i64) -> AuthResult<Uuid> {
        let existing: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM users WHERE provider = ?1 AND account = ?2;",
                params![provider, account],
                |row| row.get(0),
            )
            .optional()?;

        match existing {
            Some(text) => Uuid::parse_str(&text).map_err(|_| {
                AuthError::InvalidData(format!("invalid uuid value `{text}` in users.id"))
            }),
            None => {
                let user_id = Uuid::new_v4();
                self.conn.execute(
                    "INSERT INTO users (id, provider, account, created_at)
                     VALUES (?1, ?2, ?3, ?4);",
                    params![user_id.to_string(), provider, account, now_ms],
                )?;
                info!("event=user_create module=auth status=ok provider={provider}");
                Ok(user_id)
            }
        }
    }
}

impl<C: Clock> AuthGateway for SqliteAuthGateway<'_, C> {
    fn get_session(&self) -> AuthResult<Option<Session>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, user_id, provider, account, created_at
                 FROM sessions
                 ORDER BY created_at DESC
                 LIMIT 1;",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, user_id, provider, account, created_at)) = row else {
            return Ok(None);
        };
        Ok(Some(Session {
            id: parse_uuid(&id, "sessions.id")?,
            user_id: parse_uuid(&user_id, "sessions.user_id")?,
            provider,
            account,
            created_at,
        }))
    }

    fn sign_in_with_oauth(&self, request: &OAuthRequest) -> AuthResult<Session> {
        let (provider, account) = request.normalized()?;
        let now_ms = self.clock.now_ms();

        let tx = self.conn.unchecked_transaction()?;
        let user_id = self.resolve_user(&provider, &account, now_ms)?;
        let session = Session {
            id: Uuid::new_v4(),
            user_id,
            provider,
            account,
            created_at: now_ms,
        };
        tx.execute("DELETE FROM sessions;", [])?;
        tx.execute(
            "INSERT INTO sessions (id, user_id, provider, account, redirect_to, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                session.id.to_string(),
                session.user_id.to_string(),
                session.provider.as_str(),
                session.account.as_str(),
                request.redirect_to.as_deref(),
                session.created_at,
            ],
        )?;
        tx.commit()?;

        info!(
            "event=sign_in module=auth status=ok provider={} user_id={}",
            session.provider, session.user_id
        );
        self.listeners.emit(&AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    fn sign_out(&self) -> AuthResult<()> {
        let removed = self.conn.execute("DELETE FROM sessions;", [])?;
        info!("event=sign_out module=auth status=ok removed={removed}");
        self.listeners.emit(&AuthEvent::SignedOut);
        Ok(())
    }

    fn on_auth_state_change(
        &self,
        listener: Box<dyn Fn(&AuthEvent) + Send + Sync>,
    ) -> Subscription {
        self.listeners.subscribe(listener)
    }
}

fn parse_uuid(text: &str, column: &str) -> AuthResult<Uuid> {
    Uuid::parse_str(text)
        .map_err(|_| AuthError::InvalidData(format!("invalid uuid value `{text}` in {column}")))
}

//! Authenticated session state, owned explicitly by whoever needs it.
//!
//! `SessionHolder` wraps a [`KeyValueStore`] so the token survives restarts:
//! create it once with [`SessionHolder::initialize`], mutate it through
//! `set_token` / `sign_in`, and drop everything with `clear` on logout.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;

use crate::constants::{ROLE_KEY, TOKEN_KEY};
use crate::error::{Error, Result};
use crate::logging;
use crate::storage::KeyValueStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub user_role: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Claims read from the sign-in token. Only the fields the client uses.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Decode the payload segment of a JWT without verifying its signature.
pub fn decode_claims(token: &str) -> Result<TokenClaims> {
    let payload = token
        .split('.')
        .nth(1)
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| Error::Token("expected three dot-separated segments".into()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|err| Error::Token(err.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|err| Error::Token(err.to_string()))
}

pub struct SessionHolder<S: KeyValueStore> {
    store: S,
    session: Session,
}

impl<S: KeyValueStore> SessionHolder<S> {
    /// Load the persisted session. Absent values yield an empty session.
    pub fn initialize(store: S) -> Self {
        let session = Session {
            token: store.get(TOKEN_KEY).filter(|token| !token.is_empty()),
            user_role: store.get(ROLE_KEY).filter(|role| !role.is_empty()),
        };
        Self { store, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn token(&self) -> Option<&str> {
        self.session.token.as_deref()
    }

    /// The token, or `NotAuthenticated` when nobody is signed in.
    pub fn require_token(&self) -> Result<&str> {
        self.token().ok_or(Error::NotAuthenticated)
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        let token = token.into();
        self.store.set(TOKEN_KEY, &token);
        self.session.token = Some(token);
    }

    pub fn set_role(&mut self, role: impl Into<String>) {
        let role = role.into();
        self.store.set(ROLE_KEY, &role);
        self.session.user_role = Some(role);
    }

    /// Store a freshly issued token along with the role it carries.
    ///
    /// The role always comes from the new token. An undecodable token is still
    /// stored, with no role.
    pub fn sign_in(&mut self, token: impl Into<String>) {
        let token = token.into();
        match decode_claims(&token) {
            Ok(TokenClaims { role: Some(role), .. }) => self.set_role(role),
            Ok(_) => self.clear_role(),
            Err(err) => {
                logging::warn(
                    "session.claims",
                    "Could not read role from sign-in token",
                    json!({ "error": err.to_string() }),
                );
                self.clear_role();
            }
        }
        self.set_token(token);
    }

    fn clear_role(&mut self) {
        self.store.remove(ROLE_KEY);
        self.session.user_role = None;
    }

    /// Forget the session and wipe every persisted key.
    pub fn clear(&mut self) {
        self.store.clear();
        self.session = Session::default();
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn token_with(payload: &str) -> String {
        format!("e30.{}.sig", URL_SAFE_NO_PAD.encode(payload))
    }

    #[test]
    fn empty_store_gives_empty_session() {
        let holder = SessionHolder::initialize(MemoryStore::new());
        assert_eq!(holder.session(), &Session::default());
        assert!(matches!(holder.require_token(), Err(Error::NotAuthenticated)));
    }

    #[test]
    fn token_persists_into_next_initialize() {
        let mut holder = SessionHolder::initialize(MemoryStore::new());
        holder.set_token("abc");
        let holder = SessionHolder::initialize(holder.into_store());
        assert_eq!(holder.token(), Some("abc"));
    }

    #[test]
    fn clear_then_initialize_is_empty() {
        let mut holder = SessionHolder::initialize(MemoryStore::new());
        holder.set_token("abc");
        holder.set_role("user");
        holder.clear();
        assert!(!holder.session().is_authenticated());
        assert!(holder.store().is_empty());

        let holder = SessionHolder::initialize(holder.into_store());
        assert_eq!(holder.session(), &Session::default());
    }

    #[test]
    fn sign_in_records_role_from_claims() {
        let mut holder = SessionHolder::initialize(MemoryStore::new());
        let token = token_with(r#"{"role":"admin","email":"a@b.co"}"#);
        holder.sign_in(token.clone());

        assert_eq!(holder.token(), Some(token.as_str()));
        assert_eq!(holder.session().user_role.as_deref(), Some("admin"));
    }

    #[test]
    fn sign_in_keeps_opaque_tokens() {
        let mut holder = SessionHolder::initialize(MemoryStore::new());
        holder.sign_in("opaque");
        assert_eq!(holder.token(), Some("opaque"));
        assert!(holder.session().user_role.is_none());
    }

    #[test]
    fn new_sign_in_replaces_previous_role() {
        let mut holder = SessionHolder::initialize(MemoryStore::new());
        holder.sign_in(token_with(r#"{"role":"admin"}"#));
        holder.sign_in(token_with(r#"{"email":"viewer@nse.in"}"#));
        assert!(holder.session().user_role.is_none());

        let mut holder = SessionHolder::initialize(holder.into_store());
        assert_eq!(holder.session().user_role, None);

        holder.sign_in(token_with(r#"{"role":"admin"}"#));
        holder.sign_in("opaque");
        let holder = SessionHolder::initialize(holder.into_store());
        assert_eq!(holder.session().user_role, None);
        assert_eq!(holder.token(), Some("opaque"));
    }

    #[test]
    fn decode_claims_rejects_garbage() {
        assert!(decode_claims("nodots").is_err());
        assert!(decode_claims("a.!!!.c").is_err());
    }
}

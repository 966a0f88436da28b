/// Session persistence: the bearer token and the signed-in user's id.
///
/// Presence of a token is the only thing `is_authenticated` checks. It does
/// not ask the backend whether the token is still valid.

use crate::error::Result;
use crate::storage::KeyValueStore;
use std::sync::Arc;

pub const AUTH_TOKEN_KEY: &str = "authToken";
pub const USER_ID_KEY: &str = "userId";

#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        SessionStore { store }
    }

    /// Persist token and user id together
    pub fn save(&self, token: &str, user_id: i64) -> Result<()> {
        let user_id = user_id.to_string();
        self.store
            .set_many(&[(AUTH_TOKEN_KEY, token), (USER_ID_KEY, user_id.as_str())])?;
        log::debug!("Session saved for user id {}", user_id);
        Ok(())
    }

    /// Forget the session; safe to call when nothing is stored
    pub fn clear(&self) -> Result<()> {
        self.store.remove_all(&[AUTH_TOKEN_KEY, USER_ID_KEY])?;
        log::debug!("Session cleared");
        Ok(())
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.current_token()?.is_some())
    }

    pub fn current_token(&self) -> Result<Option<String>> {
        Ok(self.store.get(AUTH_TOKEN_KEY)?.filter(|t| !t.is_empty()))
    }

    pub fn current_user_id(&self) -> Result<Option<i64>> {
        let Some(raw) = self.store.get(USER_ID_KEY)? else {
            return Ok(None);
        };
        match raw.parse::<i64>() {
            Ok(id) => Ok(Some(id)),
            Err(_) => {
                log::warn!("Ignoring unparsable stored user id {:?}", raw);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{LocalStore, MemoryStore};

    fn memory_session() -> SessionStore {
        SessionStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_save_then_read_back() {
        let session = memory_session();
        session.save("abc", 7).unwrap();
        assert_eq!(session.current_token().unwrap().as_deref(), Some("abc"));
        assert_eq!(session.current_user_id().unwrap(), Some(7));
        assert!(session.is_authenticated().unwrap());
    }

    #[test]
    fn test_latest_save_wins() {
        let session = memory_session();
        for (token, id) in [("t1", 1), ("t2", 22), ("t3", -5)] {
            session.save(token, id).unwrap();
            assert_eq!(session.current_token().unwrap().as_deref(), Some(token));
            assert_eq!(session.current_user_id().unwrap(), Some(id));
        }
    }

    #[test]
    fn test_clear_from_any_state() {
        let session = memory_session();
        session.clear().unwrap();
        assert!(!session.is_authenticated().unwrap());

        session.save("abc", 7).unwrap();
        session.clear().unwrap();
        assert!(!session.is_authenticated().unwrap());
        assert!(session.current_token().unwrap().is_none());
        assert!(session.current_user_id().unwrap().is_none());

        // Idempotent
        session.clear().unwrap();
    }

    #[test]
    fn test_unparsable_user_id_reads_as_absent() {
        let store = Arc::new(MemoryStore::new());
        store.set(USER_ID_KEY, "seven").unwrap();
        let session = SessionStore::new(store);
        assert_eq!(session.current_user_id().unwrap(), None);
    }

    #[test]
    fn test_empty_token_is_not_a_session() {
        let store = Arc::new(MemoryStore::new());
        store.set(AUTH_TOKEN_KEY, "").unwrap();
        let session = SessionStore::new(store);
        assert!(!session.is_authenticated().unwrap());
    }

    #[test]
    fn test_sqlite_backed_session() {
        let session = SessionStore::new(Arc::new(LocalStore::in_memory().unwrap()));
        session.save("tok", 42).unwrap();
        assert_eq!(session.current_user_id().unwrap(), Some(42));
        session.clear().unwrap();
        assert!(!session.is_authenticated().unwrap());
    }
}

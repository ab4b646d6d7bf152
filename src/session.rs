use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, SystemTime};
use uuid::Uuid;

/// An authenticated session, resolved explicitly per request.
///
/// The core components stay stateless between calls; the logged-in user
/// travels through this context object rather than any ambient flag.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Username of the authenticated user
    pub username: String,

    /// Time when the session expires
    pub expires_at: SystemTime,
}

lazy_static! {
    static ref SESSIONS: RwLock<HashMap<String, SessionContext>> = RwLock::new(HashMap::new());
}

const SESSION_DURATION: u64 = 24 * 60 * 60; // 24 hours in seconds

/// Create and store a new session for an authenticated user.
///
/// # Returns
/// * `String` - A unique session ID
pub fn create_session(username: &str) -> String {
    let session_id = Uuid::new_v4().to_string();
    let context = SessionContext {
        username: username.to_string(),
        expires_at: SystemTime::now() + Duration::from_secs(SESSION_DURATION),
    };

    let mut sessions = SESSIONS.write().unwrap();
    sessions.insert(session_id.clone(), context);

    session_id
}

/// Resolve a session ID into its context, if valid and not expired.
pub fn validate_session(session_id: &str) -> Option<SessionContext> {
    let sessions = SESSIONS.read().unwrap();

    match sessions.get(session_id) {
        Some(context) if context.expires_at > SystemTime::now() => Some(context.clone()),
        _ => None,
    }
}

/// Drop a session on logout; unknown IDs are ignored.
pub fn destroy_session(session_id: &str) {
    let mut sessions = SESSIONS.write().unwrap();
    sessions.remove(session_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_round_trip() {
        let id = create_session("alice");
        let context = validate_session(&id).expect("session should be valid");
        assert_eq!(context.username, "alice");

        destroy_session(&id);
        assert!(validate_session(&id).is_none());
    }

    #[test]
    fn unknown_session_is_invalid() {
        assert!(validate_session("not-a-session").is_none());
    }
}

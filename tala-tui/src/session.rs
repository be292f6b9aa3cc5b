//! Auth session state and the background token refresh manager.
//!
//! The session is owned by the root `App` and shared with the gateway and the
//! refresh task. The backend rotates the bearer/refresh pair on a fixed
//! interval as long as the user is not idle, mirroring the web client's
//! keep-alive behavior.

use crate::api_client::FormsClient;
use crate::events::TuiEvent;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tala_api::TokenPair;
use tokio::sync::mpsc;

#[derive(Debug)]
pub struct Session {
    tokens: Option<TokenPair>,
    last_activity: Instant,
    idle_threshold: Duration,
}

pub type SharedSession = Arc<RwLock<Session>>;

impl Session {
    pub fn new(tokens: TokenPair, idle_threshold: Duration) -> Self {
        Self {
            tokens: Some(tokens),
            last_activity: Instant::now(),
            idle_threshold,
        }
    }

    pub fn shared(tokens: TokenPair, idle_threshold: Duration) -> SharedSession {
        Arc::new(RwLock::new(Self::new(tokens, idle_threshold)))
    }

    /// Record user activity; called on every key event.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn is_idle(&self) -> bool {
        self.last_activity.elapsed() >= self.idle_threshold
    }

    pub fn access_token(&self) -> Option<String> {
        self.tokens.as_ref().map(|t| t.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.tokens.as_ref().map(|t| t.refresh_token.clone())
    }

    pub fn set_tokens(&mut self, tokens: TokenPair) {
        self.tokens = Some(tokens);
    }

    /// Drop the token pair. Called on logout/quit.
    pub fn clear(&mut self) {
        self.tokens = None;
    }
}

/// Refresh the token pair on a fixed interval unless the user is idle.
/// Failures become warnings; the task itself never dies.
pub fn spawn_refresh_manager(
    client: FormsClient,
    session: SharedSession,
    interval: Duration,
    sender: mpsc::Sender<TuiEvent>,
) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick fires immediately; the pair from the config is
        // still fresh, so skip it.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let refresh_token = {
                let session = match session.read() {
                    Ok(session) => session,
                    Err(_) => break,
                };
                if session.is_idle() {
                    tracing::debug!("token refresh skipped: user idle");
                    continue;
                }
                session.refresh_token()
            };
            let Some(refresh_token) = refresh_token else {
                // Logged out; nothing left to keep alive.
                break;
            };
            match client.refresh_tokens(&refresh_token).await {
                Ok(pair) => {
                    if let Ok(mut session) = session.write() {
                        session.set_tokens(pair);
                    }
                    tracing::debug!("token pair refreshed");
                    let _ = sender.send(TuiEvent::TokensRefreshed).await;
                }
                Err(err) => {
                    tracing::warn!("token refresh failed: {err}");
                    let _ = sender
                        .send(TuiEvent::ApiError(format!("Token refresh failed: {err}")))
                        .await;
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> TokenPair {
        TokenPair {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
        }
    }

    #[test]
    fn fresh_session_is_not_idle() {
        let session = Session::new(pair(), Duration::from_secs(600));
        assert!(!session.is_idle());
    }

    #[test]
    fn zero_threshold_is_immediately_idle() {
        let session = Session::new(pair(), Duration::from_millis(0));
        assert!(session.is_idle());
    }

    #[test]
    fn clear_drops_tokens() {
        let mut session = Session::new(pair(), Duration::from_secs(600));
        session.clear();
        assert!(session.access_token().is_none());
        assert!(session.refresh_token().is_none());
    }
}

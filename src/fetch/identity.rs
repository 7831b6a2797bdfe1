//! Request identity management
//!
//! An identity is the user agent plus optional proxy a request goes out
//! under. The pool hands identities out round-robin; rotation advances the
//! cursor so a blocked identity is not immediately reused.

use crate::config::IdentityConfig;
use std::sync::atomic::{AtomicUsize, Ordering};

/// The presentation of a single outgoing request
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    /// User-Agent header value
    pub user_agent: String,

    /// Proxy URL, if the pool has proxies configured
    pub proxy: Option<String>,
}

/// Round-robin pool of request identities
///
/// User agents and proxies rotate on a shared cursor, so consecutive
/// rotations change both when both lists are populated.
pub struct IdentityPool {
    user_agents: Vec<String>,
    proxies: Vec<String>,
    rotate_user_agents: bool,
    cursor: AtomicUsize,
}

impl IdentityPool {
    /// Creates a pool from the identity config
    ///
    /// Config validation guarantees at least one user agent. When
    /// `rotate-user-agents` is off, the first user agent is pinned and
    /// rotation only cycles proxies.
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            user_agents: config.user_agents.clone(),
            proxies: config.proxies.clone(),
            rotate_user_agents: config.rotate_user_agents,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Returns the identity at the current cursor without advancing
    pub fn current(&self) -> Identity {
        self.identity_at(self.cursor.load(Ordering::SeqCst))
    }

    /// Advances the cursor and returns the new identity
    pub fn rotate(&self) -> Identity {
        let next = self.cursor.fetch_add(1, Ordering::SeqCst) + 1;
        self.identity_at(next)
    }

    fn identity_at(&self, cursor: usize) -> Identity {
        let agent_cursor = if self.rotate_user_agents { cursor } else { 0 };
        let user_agent = self.user_agents[agent_cursor % self.user_agents.len()].clone();
        let proxy = if self.proxies.is_empty() {
            None
        } else {
            Some(self.proxies[cursor % self.proxies.len()].clone())
        };

        Identity { user_agent, proxy }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> IdentityConfig {
        IdentityConfig {
            user_agents: vec!["agent-a".to_string(), "agent-b".to_string()],
            proxies: vec![],
            rotate_user_agents: true,
        }
    }

    #[test]
    fn test_current_is_stable() {
        let pool = IdentityPool::new(&create_test_config());
        assert_eq!(pool.current().user_agent, "agent-a");
        assert_eq!(pool.current().user_agent, "agent-a");
    }

    #[test]
    fn test_rotate_advances_round_robin() {
        let pool = IdentityPool::new(&create_test_config());
        assert_eq!(pool.rotate().user_agent, "agent-b");
        assert_eq!(pool.rotate().user_agent, "agent-a");
        assert_eq!(pool.rotate().user_agent, "agent-b");
    }

    #[test]
    fn test_no_proxies_means_none() {
        let pool = IdentityPool::new(&create_test_config());
        assert_eq!(pool.current().proxy, None);
    }

    #[test]
    fn test_proxies_rotate_with_cursor() {
        let config = IdentityConfig {
            user_agents: vec!["agent-a".to_string()],
            proxies: vec![
                "http://proxy1:8080".to_string(),
                "http://proxy2:8080".to_string(),
            ],
            rotate_user_agents: true,
        };
        let pool = IdentityPool::new(&config);
        assert_eq!(pool.current().proxy.as_deref(), Some("http://proxy1:8080"));
        assert_eq!(pool.rotate().proxy.as_deref(), Some("http://proxy2:8080"));
    }

    #[test]
    fn test_pinned_user_agent_still_rotates_proxies() {
        let config = IdentityConfig {
            user_agents: vec!["agent-a".to_string(), "agent-b".to_string()],
            proxies: vec![
                "http://proxy1:8080".to_string(),
                "http://proxy2:8080".to_string(),
            ],
            rotate_user_agents: false,
        };
        let pool = IdentityPool::new(&config);

        let rotated = pool.rotate();
        assert_eq!(rotated.user_agent, "agent-a");
        assert_eq!(rotated.proxy.as_deref(), Some("http://proxy2:8080"));
    }
}

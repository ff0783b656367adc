use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use axum::http::StatusCode;
use tokio::sync::RwLock;
use tracing::info;

/// Client address -> authenticated login, for the lifetime of the process.
///
/// Keyed by IP only, so every connection from one host shares a session.
/// There is no expiry and no logout; signing in again from the same address
/// replaces the binding.
#[derive(Clone, Default)]
pub struct Sessions {
    inner: Arc<RwLock<HashMap<IpAddr, String>>>,
}

impl Sessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn bind(&self, addr: IpAddr, login: String) {
        let previous = self.inner.write().await.insert(addr, login.clone());
        match previous {
            Some(old) if old != login => info!("Session for {} moved from {} to {}", addr, old, login),
            Some(_) => {}
            None => info!("Session for {} bound to {}", addr, login),
        }
    }

    pub async fn resolve(&self, addr: IpAddr) -> Option<String> {
        self.inner.read().await.get(&addr).cloned()
    }

    /// The login bound to `addr`, or `401 Unauthorized`.
    pub async fn require(&self, addr: IpAddr) -> Result<String, StatusCode> {
        match self.resolve(addr).await {
            Some(login) => Ok(login),
            None => {
                info!("No session for {}", addr);
                Err(StatusCode::UNAUTHORIZED)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[tokio::test]
    async fn bind_overwrites_and_resolve_is_per_address() {
        let sessions = Sessions::new();
        let a = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let b = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

        assert_eq!(sessions.resolve(a).await, None);
        sessions.bind(a, "alice".into()).await;
        sessions.bind(a, "bob".into()).await;

        assert_eq!(sessions.resolve(a).await.as_deref(), Some("bob"));
        assert_eq!(sessions.require(b).await, Err(StatusCode::UNAUTHORIZED));
    }
}

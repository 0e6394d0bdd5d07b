use stash_sync_models::ServerConnection;

const DEFAULT_SCHEME: &str = "http";
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 9999;

/// Where to reach the local Stash GraphQL API for this run.
///
/// Built once from the plugin input and handed to the client explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StashConnection {
    pub graphql_url: String,
    pub session_cookie: Option<String>,
}

impl StashConnection {
    pub fn from_server_connection(conn: &ServerConnection) -> Self {
        let scheme = conn
            .scheme
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SCHEME);
        let host = outbound_host(conn.host.as_deref().unwrap_or(DEFAULT_HOST));
        let port = conn.port.unwrap_or(DEFAULT_PORT);

        let host = if host.contains(':') && !host.starts_with('[') {
            format!("[{}]", host)
        } else {
            host.to_string()
        };

        Self {
            graphql_url: format!("{}://{}:{}/graphql", scheme, host, port),
            session_cookie: conn
                .session_cookie
                .as_ref()
                .and_then(|c| c.value.clone())
                .filter(|v| !v.is_empty()),
        }
    }

    /// Value for the `Cookie` header, if Stash handed us a session
    pub fn cookie_header(&self) -> Option<String> {
        self.session_cookie
            .as_ref()
            .map(|value| format!("session={}", value))
    }
}

/// Stash may listen on a bind-all address; we can't connect to that, so go
/// through loopback instead
fn outbound_host(host: &str) -> &str {
    match host {
        "" | "0.0.0.0" | "::" | "[::]" => DEFAULT_HOST,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stash_sync_models::SessionCookie;

    #[test]
    fn test_bind_all_host_is_rewritten() {
        let conn = ServerConnection {
            scheme: Some("https".to_string()),
            host: Some("0.0.0.0".to_string()),
            port: Some(9443),
            session_cookie: None,
        };
        let stash = StashConnection::from_server_connection(&conn);
        assert_eq!(stash.graphql_url, "https://localhost:9443/graphql");
        assert!(stash.cookie_header().is_none());
    }

    #[test]
    fn test_defaults_and_cookie() {
        let conn = ServerConnection {
            scheme: None,
            host: None,
            port: None,
            session_cookie: Some(SessionCookie {
                name: Some("session".to_string()),
                value: Some("abc".to_string()),
            }),
        };
        let stash = StashConnection::from_server_connection(&conn);
        assert_eq!(stash.graphql_url, "http://localhost:9999/graphql");
        assert_eq!(stash.cookie_header().as_deref(), Some("session=abc"));
    }

    #[test]
    fn test_explicit_host_is_kept() {
        let conn = ServerConnection {
            scheme: Some("http".to_string()),
            host: Some("192.168.1.20".to_string()),
            port: Some(9999),
            session_cookie: Some(SessionCookie { name: None, value: Some(String::new()) }),
        };
        let stash = StashConnection::from_server_connection(&conn);
        assert_eq!(stash.graphql_url, "http://192.168.1.20:9999/graphql");
        assert!(stash.session_cookie.is_none());
    }
}

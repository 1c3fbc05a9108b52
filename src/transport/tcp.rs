//! TCP connector with optional TLS

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

use crate::config::EndpointConfig;

use super::{Connector, DuplexIo, TransportError};

/// Connects to a node endpoint over TCP, wrapping the stream in TLS when
/// transport security is enabled.
#[derive(Clone)]
pub struct TcpConnector {
    host: String,
    port: u16,
    tls: Option<TlsConnector>,
    connect_timeout: Option<Duration>,
}

impl TcpConnector {
    /// Plain TCP connector for `host:port`
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            tls: None,
            connect_timeout: None,
        }
    }

    /// Build a connector from endpoint configuration
    pub fn from_config(endpoint: &EndpointConfig) -> Self {
        let mut connector = Self::new(endpoint.host.clone(), endpoint.port);
        if endpoint.tls {
            connector = connector.with_tls();
        }
        if let Some(seconds) = endpoint.connect_timeout_seconds {
            connector = connector.with_connect_timeout(Duration::from_secs(seconds));
        }
        connector
    }

    /// Enable TLS, verifying the server against the webpki root store
    pub fn with_tls(mut self) -> Self {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let config = ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth();
        self.tls = Some(TlsConnector::from(Arc::new(config)));
        self
    }

    /// Bound the time spent establishing the connection
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// `host:port` this connector dials
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether connections are wrapped in TLS
    pub fn is_tls(&self) -> bool {
        self.tls.is_some()
    }
}

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self) -> Result<Box<dyn DuplexIo>, TransportError> {
        let address = self.address();
        let connect = TcpStream::connect(address.as_str());

        let stream = match self.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, connect)
                .await
                .map_err(|_| TransportError::ConnectionTimeout)?,
            None => connect.await,
        }
        .map_err(|e| TransportError::ConnectionFailed(format!("{}: {}", address, e)))?;
        stream.set_nodelay(true)?;

        let Some(tls) = &self.tls else {
            return Ok(Box::new(stream));
        };

        let server_name = ServerName::try_from(self.host.clone())
            .map_err(|e| {
                TransportError::Tls(format!("invalid server name '{}': {}", self.host, e))
            })?;
        let stream = tls
            .connect(server_name, stream)
            .await
            .map_err(|e| TransportError::Tls(e.to_string()))?;

        Ok(Box::new(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_from_config() {
        let endpoint = EndpointConfig {
            host: "node.example".to_string(),
            port: 16110,
            tls: true,
            connect_timeout_seconds: Some(5),
        };

        let connector = TcpConnector::from_config(&endpoint);
        assert_eq!(connector.address(), "node.example:16110");
        assert!(connector.is_tls());
        assert_eq!(connector.connect_timeout, Some(Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn test_connects_to_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let connector = TcpConnector::new("127.0.0.1", port);
        let (accepted, connected) = tokio::join!(listener.accept(), connector.connect());

        assert!(accepted.is_ok());
        assert!(connected.is_ok());
    }

    #[tokio::test]
    async fn test_refused_connection_is_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = TcpConnector::new("127.0.0.1", port).connect().await;
        assert!(matches!(result, Err(TransportError::ConnectionFailed(_))));
    }
}

use crate::{TcwError, TcwResult, core::domain::model::connection::Connection};
use reqwest::Client;

/// An HTTP client scoped to one logical operation.
///
/// Idle connections are never pooled, so every operation dials the server
/// afresh; the client and its sockets are released when the session drops.
#[derive(Debug)]
pub struct HttpSession {
    client: Client,
}

impl HttpSession {
    pub fn open(connection: &Connection) -> TcwResult<Self> {
        let mut builder = Client::builder()
            .danger_accept_invalid_certs(connection.accepts_invalid_certs())
            .pool_max_idle_per_host(0);
        if let Some(timeout) = connection.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TcwError::Transport(e.to_string()))?;
        tracing::trace!("HTTP session opened");
        Ok(Self { client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl Drop for HttpSession {
    fn drop(&mut self) {
        tracing::trace!("HTTP session released");
    }
}

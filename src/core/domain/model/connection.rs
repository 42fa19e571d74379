use crate::core::domain::{model::credential_record::CredentialRecord, value_object::ServerUrl};
use std::time::Duration;

/// Everything needed to reach and log in to one server.
#[derive(Debug, Clone)]
pub struct Connection {
    record: CredentialRecord,
    server: ServerUrl,
    accept_invalid_certs: bool,
    request_timeout: Option<Duration>,
}

impl Connection {
    pub fn new(
        record: CredentialRecord,
        accept_invalid_certs: bool,
        request_timeout: Option<Duration>,
    ) -> Self {
        let server = record.server_url();
        Self {
            record,
            server,
            accept_invalid_certs,
            request_timeout,
        }
    }

    pub fn record(&self) -> &CredentialRecord {
        &self.record
    }

    pub fn login(&self) -> &str {
        &self.record.login
    }

    pub fn password(&self) -> &str {
        &self.record.password
    }

    pub fn server(&self) -> &ServerUrl {
        &self.server
    }

    pub fn accepts_invalid_certs(&self) -> bool {
        self.accept_invalid_certs
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }
}

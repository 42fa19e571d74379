pub mod api_client;
pub mod credential_cipher;
pub mod credential_store;
pub mod http_session;
pub mod machine_identity;

pub mod connection;
pub mod credential_record;
pub mod node;
pub mod pending_update;

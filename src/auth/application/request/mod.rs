pub mod login_request;

mod client_tests;
mod node_tests;

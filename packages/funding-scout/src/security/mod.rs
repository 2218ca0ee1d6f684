//! Secret handling for collaborator credentials.

mod credentials;

pub use credentials::{SearchCredentials, SecretString};

//! # mailrules-oauth
//!
//! `OAuth2` token handling for the Gmail REST API.
//!
//! Interactive consent happens outside this crate. What lives here is
//! everything needed once a token exists:
//!
//! - **Client secrets**: parse Google's `credentials.json`
//! - **Token storage**: load and save the token JSON file
//! - **Token refresh**: exchange a refresh token for a new access token
//! - **Provider configuration**: Google endpoints and the `gmail.modify` scope
//!
//! ## Example
//!
//! ```ignore
//! use mailrules_oauth::{ClientSecrets, OAuthClient, Provider, TokenStore};
//!
//! let secrets = ClientSecrets::load("credentials.json")?;
//! let client = OAuthClient::from_secrets(&secrets, Provider::google()?);
//! let store = TokenStore::new("token.json");
//!
//! let mut token = store.load()?.ok_or(mailrules_oauth::Error::NoToken)?;
//! if token.is_expired() {
//!     token = client.refresh_token(&token).await?;
//!     store.save(&token)?;
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
pub mod flow;
pub mod provider;
pub mod secrets;
pub mod token;

pub use error::{Error, Result};
pub use flow::OAuthClient;
pub use provider::Provider;
pub use secrets::ClientSecrets;
pub use token::{Token, TokenStore};

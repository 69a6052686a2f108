mod none;
mod token;
mod traits;
mod types;

pub use none::*;
pub use token::*;
pub use traits::*;
pub use types::*;

use std::sync::Arc;

use crate::config::AuthConfig;
use crate::library::LibraryStore;

/// Build the authenticator selected by `[auth] method`.
pub fn create_authenticator(
    config: &AuthConfig,
    store: Arc<dyn LibraryStore>,
) -> Box<dyn Authenticator> {
    use crate::config::AuthMethod;

    match config.method {
        AuthMethod::None => Box::new(NoneAuthenticator),
        AuthMethod::Token => Box::new(UserTokenAuthenticator::new(store)),
    }
}

pub mod oauth;

pub use oauth::{authenticate_handler, authorization_handler, callback_handler, invalidate_handler};

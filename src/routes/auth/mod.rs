pub mod claims;
pub mod login;
pub mod logout;
pub mod session;

pub use login::{handle_login, handle_me};
pub use logout::handle_logout;

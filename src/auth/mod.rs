pub mod cookie;
pub mod credentials;
pub mod handlers;
pub mod password;
pub mod token;

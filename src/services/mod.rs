pub mod cookies;
pub mod error;
pub mod library;
pub mod news;
pub mod otp;
pub mod password;
pub mod search;
pub mod session;

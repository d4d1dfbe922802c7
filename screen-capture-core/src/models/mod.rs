pub mod error;
pub mod identity;
pub mod state;
pub mod stream;

//! Data models shared by the API client, forms and views.

pub mod choice;
pub mod emergency;
pub mod quote;
pub mod user;

pub use choice::Choice;
pub use emergency::*;
pub use quote::*;
pub use user::*;

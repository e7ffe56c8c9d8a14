pub mod user;

pub use user::{validate, User, UserInput, UserRepository};

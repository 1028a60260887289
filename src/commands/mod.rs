pub mod compare;
pub mod predict;
pub mod profile;

mod output;
mod session;

pub mod serve;
pub mod setup;

pub mod interface;
pub mod provider;

pub mod batch;
pub mod output;
pub mod provider;
pub mod store;

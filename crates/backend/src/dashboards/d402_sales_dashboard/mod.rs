pub mod aggregator;
pub mod dataset;
pub mod error;
pub mod options;
pub mod pipeline;
pub mod repository;
pub mod service;

#[cfg(test)]
pub(crate) mod test_data;

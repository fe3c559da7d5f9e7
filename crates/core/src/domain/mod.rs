pub mod contract;
pub mod headline;
pub mod message;
pub mod sentiment;
pub mod ticker;

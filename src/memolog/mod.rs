pub mod audit;
pub mod batch;
pub mod catalog;
pub mod config;
pub mod inbox;
pub mod merge;
pub mod paths;
pub mod section;
pub mod store;
pub mod util;
pub mod warn;

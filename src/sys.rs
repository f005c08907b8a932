pub mod event;
pub mod executor;
pub mod geometry;
pub mod query;
pub mod timer;

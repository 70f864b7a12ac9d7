pub mod batch;
pub mod document;
pub mod error;
pub mod executable_utils;
pub mod generator;
pub mod model;
pub mod notifier;
pub mod queue;
pub mod renderer;
pub mod storage;

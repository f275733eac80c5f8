pub mod approval;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod docstore;
pub mod pipeline;
pub mod plan;
pub mod router;
pub mod shared;
pub mod task;

//! Command implementations

pub mod completions;
pub mod init;
pub mod run;
pub mod tpl;
pub mod validate;
pub mod workflow;

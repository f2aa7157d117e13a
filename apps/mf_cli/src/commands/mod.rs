// apps/mf_cli/src/commands/mod.rs

//! 子命令

pub mod run;
pub mod validate;

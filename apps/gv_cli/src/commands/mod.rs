// apps/gv_cli/src/commands/mod.rs

//! 子命令

pub mod demo;
pub mod info;
pub mod validate;

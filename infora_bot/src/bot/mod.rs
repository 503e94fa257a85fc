pub mod answers;
pub mod commands;
pub mod handler;
pub mod handler_tree;

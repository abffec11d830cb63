pub mod args;
pub mod shell;
pub mod validation;

//! A small interactive shell for working with files, built around a batch
//! renaming command.
//!
//! The main entry point is [`Interpreter`], which executes command lines using a set of
//! pluggable factories. `massrename` is driven by three independent pieces:
//! [`lexer`] splits a command line into arguments, [`template`] compiles and
//! renders name templates, and [`rename`] runs the filter/groups/show/execute
//! pipeline over a directory. The public modules [`command`] and [`env`] expose
//! traits and types for implementing your own commands and for interacting with
//! the shell environment.

mod builtin;
pub mod command;
pub mod env;
mod interpreter;
pub mod lexer;
pub mod rename;
pub mod template;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::Interpreter;

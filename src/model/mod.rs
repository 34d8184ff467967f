//! Data model of a trace
//!
//! This module provides the structures a traced program manipulates:
//! - [`value`]: values stored in variables and returned from calls
//! - [`listing`]: code listings with `[[tag|text]]` regions
//! - [`function`]: static function descriptors
//! - [`variable`]: variables, image variables, arrays and records
//! - [`frame`]: one function activation and its symbol table
//! - [`stack`]: the call stack of live frames

pub mod frame;
pub mod function;
pub mod listing;
pub mod stack;
pub mod value;
pub mod variable;

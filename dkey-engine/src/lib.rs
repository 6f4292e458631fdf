#![no_std]
pub mod composer;
pub mod indicators;
pub mod keymap;
pub mod layer_stack;
pub mod modifiers;
pub mod overrides;
pub mod report;
pub mod scan;
mod tap_hold;
pub mod unicode;
pub mod unicode_input;

#[macro_use]
mod macros;

pub use composer::{Action, Composer};
pub use keymap::LoadError;

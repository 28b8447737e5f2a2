//! Primitives composed from cells and effects.
//!
//! Each primitive is an ordinary hook: call it while a component renders and
//! it returns the current value plus whatever handles change it.

mod counter;
mod debounce;
mod local_storage;
mod previous;
mod toggle;
mod window_size;

pub use counter::{Counter, use_counter};
pub use debounce::use_debounced;
pub use local_storage::{StoredState, load_or_default, use_local_storage};
pub use previous::use_previous;
pub use toggle::{Toggle, use_toggle};
pub use window_size::use_window_size;

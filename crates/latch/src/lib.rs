//! Latch - reusable stateful primitives for function components.
//!
//! A component is a plain function `FnMut(&P) -> O`. Mount it in a
//! [`Root`] and call hooks while it renders; their slots persist between
//! renders, their writes schedule the next render, and their effects run
//! after each commit.
//!
//! # Quick Start
//!
//! ```ignore
//! use latch::prelude::*;
//!
//! fn clicker(label: &String) -> (String, Counter) {
//!     let clicks = use_counter(0);
//!     (format!("{label}: {}", clicks.value()), clicks)
//! }
//!
//! let mut root = Root::mount("Clicks".to_string(), clicker)?;
//! root.output().1.increment();
//! root.flush()?;
//! assert_eq!(root.output().0, "Clicks: 1");
//! ```
//!
//! ## Available Hooks
//!
//! | Hook | Purpose |
//! |------|---------|
//! | [`use_cell`] / [`use_state`] | State that schedules a re-render when written |
//! | [`use_ref`] | Mutable value that never re-renders |
//! | [`use_effect`] | Side effects after commit when dependencies change |
//! | [`use_effect_cleanup`] | Effects with cleanup functions |
//! | [`use_mount`] | One-time effect on first commit |
//! | [`use_counter`] / [`use_toggle`] | Integer and boolean state |
//! | [`use_previous`] | The value from the previous render |
//! | [`use_debounced`] | A value that follows its source after a quiet period |
//! | [`use_local_storage`] | State persisted in a key-value store |
//! | [`use_window_size`] | Viewport size, kept current |
//! | [`use_resource`] / [`use_fetch`] | Async loads with stale-result protection |
//! | [`use_form`] | Field values and errors |
//!
//! Hooks may be called conditionally and in loops; see
//! [`latch_core::hooks`] for how slots are identified.
//!
//! [`use_cell`]: prelude::use_cell
//! [`use_state`]: prelude::use_state
//! [`use_ref`]: prelude::use_ref
//! [`use_effect`]: prelude::use_effect
//! [`use_effect_cleanup`]: prelude::use_effect_cleanup
//! [`use_mount`]: prelude::use_mount
//! [`use_counter`]: prelude::use_counter
//! [`use_toggle`]: prelude::use_toggle
//! [`use_previous`]: prelude::use_previous
//! [`use_debounced`]: prelude::use_debounced
//! [`use_local_storage`]: prelude::use_local_storage
//! [`use_window_size`]: prelude::use_window_size
//! [`use_resource`]: prelude::use_resource
//! [`use_fetch`]: prelude::use_fetch
//! [`use_form`]: prelude::use_form

pub mod file_store;
pub mod logging;

pub mod prelude {
    //! Common imports for latch components.
    pub use latch_core::{
        Cleanup, Counter, Deps, FormState, KeyValueStore, Resource, ResourcePhase, Root,
        RootConfig, StateCell, StoredState, Toggle, Viewport, WindowSize, hook_scope, use_cell,
        use_counter, use_debounced, use_effect, use_effect_cleanup, use_fallible_effect,
        use_fetch, use_form, use_local_storage, use_mount, use_previous, use_ref, use_resource,
        use_state, use_toggle, use_window_size, with_key,
    };
}

pub use file_store::FileStore;
pub use latch_core::{
    EffectError, FetchError, Fetcher, HookError, HttpResponse, MemoryStore, Root, RootConfig,
    SimulatedViewport, StorageError,
};
pub use logging::init_logging;

pub use latch_core as core;

//! Core stateful primitives for latch components.
//!
//! A component is a plain function re-run by a [`Root`]. Hooks called inside
//! it get slots that persist across renders: state cells, refs, effects, and
//! the derived primitives built on top of them.

pub mod cell;
pub mod error;
pub mod fetch;
pub mod form;
pub mod hooks;
pub mod primitives;
pub mod resource;
pub mod root;
pub mod store;
pub mod viewport;

pub use cell::{StateCell, StateUpdate};
pub use error::{EffectError, FetchError, HookError, StorageError};
pub use fetch::{Fetcher, HttpResponse};
pub use form::{FormData, FormState, use_form};
pub use hooks::{
    ByIdentity, Cleanup, DepValue, Deps, HookId, HookMeta, RefHandle, hook_scope, use_cell,
    use_effect, use_effect_cleanup, use_fallible_effect, use_mount, use_ref, use_state, with_key,
};
pub use primitives::{
    Counter, StoredState, Toggle, load_or_default, use_counter, use_debounced, use_local_storage,
    use_previous, use_toggle, use_window_size,
};
pub use resource::{Resource, ResourcePhase, ResourceState, use_fetch, use_resource};
pub use root::{Root, RootConfig};
pub use store::{KeyValueStore, MemoryStore};
pub use viewport::{ResizeSubscription, SimulatedViewport, Viewport, WindowSize};

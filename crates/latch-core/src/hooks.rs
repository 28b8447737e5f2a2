//! Hook slots: per-component storage for state cells, refs, and effects.
//!
//! Hooks let a component function keep state and side effects across renders.
//! Each hook call is backed by a **slot** in the component's registry, and
//! every slot has a stable [`HookId`] assigned when it is first created.
//!
//! # Hook identity
//!
//! A slot's id is derived from:
//!
//! - the source location of the hook call (every hook is `#[track_caller]`),
//! - the enclosing hook scope ([`hook_scope`] or [`with_key`]), and
//! - how many times that location was already reached in the current render.
//!
//! Because identity does not depend on global call order, hooks may be called
//! conditionally. A slot that is not reached during a render is torn down when
//! that render commits, running its effect cleanup.
//!
//! ```ignore
//! fn profile(props: &Props) -> String {
//!     let name = use_cell(|| String::from("anonymous"));
//!
//!     if props.show_clock {
//!         // Torn down (cleanup runs) on the first render where this is skipped
//!         use_mount(|| {
//!             let timer = start_clock();
//!             move || timer.stop()
//!         });
//!     }
//!
//!     for item in &props.items {
//!         // Explicit keys keep slots attached to the right item
//!         with_key(item.id, || {
//!             let expanded = use_toggle(false);
//!         });
//!     }
//!
//!     name.get()
//! }
//! ```
//!
//! # Effects
//!
//! Effects never run during render. They are queued while the component
//! function runs and executed after the render is committed, in registration
//! order. A slot's previous cleanup always runs right before its next body and
//! at teardown.
//!
//! | Dependencies | Runs |
//! |--------------|------|
//! | [`Deps::Always`] | after every render |
//! | [`Deps::Once`] | after the first render only |
//! | [`Deps::on`] | when the value differs from the previous run |
//!
//! # Misuse
//!
//! Calling a hook outside of a render panics:
//!
//! ```text
//! latch hooks error: `use_cell` called outside of render!
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::panic::Location;
use std::rc::Rc;

use crate::cell::{Invalidator, StateCell};
use crate::error::EffectError;

// ============================================================================
// Slot identity
// ============================================================================

/// Stable identity of a hook slot within one component.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct HookId(u64);

impl HookId {
    const ROOT: HookId = HookId(0);

    fn derive(parent: HookId, discriminator: impl Hash) -> Self {
        let mut hasher = DefaultHasher::new();
        parent.0.hash(&mut hasher);
        discriminator.hash(&mut hasher);
        HookId(hasher.finish())
    }
}

impl fmt::Display for HookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

type SiteKey = (&'static str, u32, u32);

fn site_key(location: &'static Location<'static>) -> SiteKey {
    (location.file(), location.line(), location.column())
}

/// Metadata about a hook slot for debugging purposes.
#[derive(Debug, Clone)]
pub struct HookMeta {
    /// Stable slot identity.
    pub id: HookId,
    /// The hook function name (e.g., "use_cell", "use_effect")
    pub hook_type: &'static str,
    /// The type of value stored (from std::any::type_name)
    pub value_type: &'static str,
    /// Where the hook was first called.
    pub location: &'static Location<'static>,
}

/// Lifecycle callbacks a slot can register with its registry.
pub(crate) trait SlotHooks {
    /// Called at the start of every render pass.
    fn begin_pass(&self) {}

    /// Called when the slot is discarded.
    fn teardown(&self) -> Result<(), EffectError> {
        Ok(())
    }
}

// ============================================================================
// Hook Registry
// ============================================================================

/// Internal storage for a single hook.
struct HookEntry {
    value: Box<dyn Any>,
    meta: HookMeta,
    lifecycle: Option<Rc<dyn SlotHooks>>,
}

/// Registry that manages hook state across renders of one component.
pub(crate) struct HookRegistry {
    hooks: HashMap<HookId, HookEntry>,
    /// Slot ids in creation order
    order: Vec<HookId>,
    /// Slots reached during the current render
    visited: HashSet<HookId>,
    /// Stack of enclosing hook scopes
    scopes: Vec<HookId>,
    /// Per-scope, per-site call counts for the current render
    occurrences: HashMap<(HookId, SiteKey), u32>,
    /// Keyed scopes entered during the current render
    keyed: HashSet<HookId>,
    /// Effects queued during the current render
    pending: Vec<PendingEffect>,
    invalidator: Rc<Invalidator>,
    is_rendering: bool,
    render_count: usize,
}

impl HookRegistry {
    pub(crate) fn new(invalidator: Rc<Invalidator>) -> Self {
        Self {
            hooks: HashMap::new(),
            order: Vec::new(),
            visited: HashSet::new(),
            scopes: Vec::new(),
            occurrences: HashMap::new(),
            keyed: HashSet::new(),
            pending: Vec::new(),
            invalidator,
            is_rendering: false,
            render_count: 0,
        }
    }

    /// Reset per-render bookkeeping and snapshot every slot.
    fn begin_render(&mut self) {
        self.visited.clear();
        self.scopes.clear();
        self.occurrences.clear();
        self.keyed.clear();
        self.pending.clear();
        self.is_rendering = true;

        for id in &self.order {
            if let Some(lifecycle) = self.hooks.get(id).and_then(|e| e.lifecycle.as_ref()) {
                lifecycle.begin_pass();
            }
        }
    }

    /// End the render, detaching slots that were not reached.
    fn end_render(&mut self) -> Commit {
        self.is_rendering = false;
        self.render_count += 1;

        let mut removed = Vec::new();
        let visited = &self.visited;
        let (kept, dropped): (Vec<HookId>, Vec<HookId>) =
            self.order.iter().copied().partition(|id| visited.contains(id));
        for id in dropped {
            if let Some(entry) = self.hooks.remove(&id) {
                tracing::debug!(
                    slot = %id,
                    hook = entry.meta.hook_type,
                    "hook slot not reached during render, tearing down"
                );
                if let Some(lifecycle) = entry.lifecycle {
                    removed.push((entry.meta, lifecycle));
                }
            }
        }
        self.order = kept;

        Commit {
            removed,
            effects: std::mem::take(&mut self.pending),
        }
    }

    fn abort_render(&mut self) {
        self.is_rendering = false;
        self.pending.clear();
    }

    fn next_id(&mut self, location: &'static Location<'static>) -> HookId {
        let parent = self.scopes.last().copied().unwrap_or(HookId::ROOT);
        let site = site_key(location);
        let count = self.occurrences.entry((parent, site)).or_insert(0);
        let occurrence = *count;
        *count += 1;
        HookId::derive(parent, (site, occurrence))
    }

    fn keyed_id(&mut self, key: impl Hash) -> HookId {
        let parent = self.scopes.last().copied().unwrap_or(HookId::ROOT);
        let id = HookId::derive(parent, ("key", key));
        if !self.keyed.insert(id) {
            tracing::warn!(
                scope = %id,
                "duplicate key under one parent, its hooks fall back to call order"
            );
        }
        id
    }

    /// Find an existing slot, validating its type.
    fn lookup<T: Clone + 'static>(&mut self, id: HookId, hook_type: &'static str) -> Option<T> {
        let entry = self.hooks.get(&id)?;

        let value = match entry.value.downcast_ref::<T>() {
            Some(value) if entry.meta.hook_type == hook_type => value.clone(),
            _ => panic!(
                "\n\n\x1b[1;31mlatch hooks error: Hook type changed for slot {}!\x1b[0m\n\
                Previous render: `{}` storing `{}` (first called at {})\n\
                Current render: `{}` storing `{}`\n\n\
                Two different hooks resolved to the same identity. If hooks are\n\
                created under `with_key`, make sure every key is unique.\n",
                id,
                entry.meta.hook_type,
                entry.meta.value_type,
                entry.meta.location,
                hook_type,
                std::any::type_name::<T>()
            ),
        };

        self.visited.insert(id);
        Some(value)
    }

    fn insert<T: 'static>(
        &mut self,
        id: HookId,
        meta: HookMeta,
        value: T,
        lifecycle: Option<Rc<dyn SlotHooks>>,
    ) {
        self.visited.insert(id);
        self.order.push(id);
        self.hooks.insert(
            id,
            HookEntry {
                value: Box::new(value),
                meta,
                lifecycle,
            },
        );
    }

    fn enqueue(&mut self, effect: PendingEffect) {
        self.pending.push(effect);
    }

    /// Remove every slot, returning lifecycles in creation order.
    pub(crate) fn drain(&mut self) -> Vec<(HookMeta, Rc<dyn SlotHooks>)> {
        let order = std::mem::take(&mut self.order);
        let mut drained = Vec::new();
        for id in order {
            if let Some(entry) = self.hooks.remove(&id)
                && let Some(lifecycle) = entry.lifecycle
            {
                drained.push((entry.meta, lifecycle));
            }
        }
        self.hooks.clear();
        drained
    }

    pub(crate) fn render_count(&self) -> usize {
        self.render_count
    }

    pub(crate) fn hook_count(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn debug_info(&self) -> Vec<HookMeta> {
        self.order
            .iter()
            .filter_map(|id| self.hooks.get(id))
            .map(|entry| entry.meta.clone())
            .collect()
    }
}

// ============================================================================
// Active registry
// ============================================================================

// Registries of the components currently rendering, innermost last.
thread_local! {
    static ACTIVE: RefCell<Vec<Rc<RefCell<HookRegistry>>>> = const { RefCell::new(Vec::new()) };
}

fn active_registry(hook_type: &'static str) -> Rc<RefCell<HookRegistry>> {
    let registry = ACTIVE.with(|active| active.borrow().last().cloned());
    match registry {
        Some(registry) if registry.borrow().is_rendering => registry,
        _ => panic!(
            "\n\n\x1b[1;31mlatch hooks error: `{}` called outside of render!\x1b[0m\n\
            Hooks can only be called while a component is rendering.\n\
            Make sure you're not calling hooks in:\n\
            - Event handlers\n\
            - Effect bodies or cleanups\n\
            - Async tasks\n",
            hook_type
        ),
    }
}

/// Pops the active registry even if the component panics.
struct RenderGuard {
    registry: Rc<RefCell<HookRegistry>>,
    finished: bool,
}

impl Drop for RenderGuard {
    fn drop(&mut self) {
        if !self.finished {
            self.registry.borrow_mut().abort_render();
        }
        ACTIVE.with(|active| {
            active.borrow_mut().pop();
        });
    }
}

/// Run one render pass of a component against its registry.
pub(crate) fn render_pass<R>(
    registry: &Rc<RefCell<HookRegistry>>,
    component: impl FnOnce() -> R,
) -> (R, Commit) {
    registry.borrow_mut().begin_render();
    ACTIVE.with(|active| active.borrow_mut().push(Rc::clone(registry)));
    let mut guard = RenderGuard {
        registry: Rc::clone(registry),
        finished: false,
    };

    let output = component();

    let commit = registry.borrow_mut().end_render();
    guard.finished = true;
    (output, commit)
}

/// Core hook implementation: get the slot for this call site or create it.
#[track_caller]
fn use_slot<T: Clone + 'static>(
    hook_type: &'static str,
    init: impl FnOnce(&Rc<Invalidator>) -> (T, Option<Rc<dyn SlotHooks>>),
) -> (HookId, T) {
    let location = Location::caller();
    let registry = active_registry(hook_type);

    let (id, invalidator) = {
        let mut registry = registry.borrow_mut();
        let id = registry.next_id(location);
        if let Some(value) = registry.lookup::<T>(id, hook_type) {
            return (id, value);
        }
        (id, Rc::clone(&registry.invalidator))
    };

    // The registry is not borrowed while user initializers run.
    let (value, lifecycle) = init(&invalidator);
    let meta = HookMeta {
        id,
        hook_type,
        value_type: std::any::type_name::<T>(),
        location,
    };
    registry
        .borrow_mut()
        .insert(id, meta, value.clone(), lifecycle);
    (id, value)
}

// ============================================================================
// Scopes
// ============================================================================

struct ScopeGuard(Rc<RefCell<HookRegistry>>);

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        self.0.borrow_mut().scopes.pop();
    }
}

fn enter_scope(registry: Rc<RefCell<HookRegistry>>, id: HookId) -> ScopeGuard {
    registry.borrow_mut().scopes.push(id);
    ScopeGuard(registry)
}

/// Group the hooks created by `f` under one identity.
///
/// Primitives built from several hooks call this so that their inner slots
/// are namespaced by the primitive's own call site.
#[track_caller]
pub fn hook_scope<R>(f: impl FnOnce() -> R) -> R {
    let location = Location::caller();
    let registry = active_registry("hook_scope");
    let id = registry.borrow_mut().next_id(location);
    let _guard = enter_scope(registry, id);
    f()
}

/// Group the hooks created by `f` under an explicit key.
///
/// Use this inside loops so that slots follow the item rather than the
/// iteration index. Keys must be unique among siblings: a repeated key logs a
/// warning and its hooks are told apart by call order only.
pub fn with_key<K: Hash, R>(key: K, f: impl FnOnce() -> R) -> R {
    let registry = active_registry("with_key");
    let id = registry.borrow_mut().keyed_id(key);
    let _guard = enter_scope(registry, id);
    f()
}

// ============================================================================
// State hooks
// ============================================================================

/// Create or retrieve a state cell owned by the rendering component.
///
/// The initializer runs exactly once, when the slot is created. Writing to
/// the cell schedules a re-render of the owning component.
///
/// # Example
///
/// ```ignore
/// fn app(_: &()) -> String {
///     let count = use_cell(|| 0);
///     let on_click = {
///         let count = count.clone();
///         move || count.update(|n| n + 1)
///     };
///     format!("Count: {}", count.get())
/// }
/// ```
#[track_caller]
pub fn use_cell<T: Clone + 'static>(init: impl FnOnce() -> T) -> StateCell<T> {
    let (_, cell) = use_slot("use_cell", |owner| {
        let cell = StateCell::owned(init(), owner);
        let lifecycle: Rc<dyn SlotHooks> = Rc::new(cell.clone());
        (cell, Some(lifecycle))
    });
    cell
}

/// Create or retrieve a state value along with its cell.
///
/// Returns the render-pass value and the cell used to change it.
///
/// ```ignore
/// let (count, set_count) = use_state(|| 0);
/// set_count.set(count + 1);
/// ```
#[track_caller]
pub fn use_state<T: Clone + 'static>(init: impl FnOnce() -> T) -> (T, StateCell<T>) {
    let cell = use_cell(init);
    (cell.get(), cell)
}

/// Create or retrieve a mutable reference that persists across renders.
///
/// Unlike cells, refs don't trigger re-renders when mutated.
#[track_caller]
pub fn use_ref<T: 'static>(init: impl FnOnce() -> T) -> RefHandle<T> {
    let (_, inner) = use_slot("use_ref", |_| (Rc::new(RefCell::new(init())), None));
    RefHandle { inner }
}

/// Handle to a ref value created by `use_ref`.
pub struct RefHandle<T> {
    inner: Rc<RefCell<T>>,
}

impl<T> RefHandle<T> {
    /// Get a reference to the current value.
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.inner.borrow()
    }

    /// Get a mutable reference to the current value.
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.inner.borrow_mut()
    }

    /// Set the value directly.
    pub fn set(&self, value: T) {
        *self.inner.borrow_mut() = value;
    }
}

impl<T: Clone> RefHandle<T> {
    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.inner.borrow().clone()
    }
}

impl<T> Clone for RefHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

// ============================================================================
// Effect hooks
// ============================================================================

/// When an effect should run.
pub enum Deps {
    /// After every render.
    Always,
    /// After the first render only; cleanup at teardown.
    Once,
    /// Whenever the value differs from the one seen on the previous run.
    On(Box<dyn DepValue>),
}

impl Deps {
    /// Run when `value` changes.
    ///
    /// Tuples and `Vec`s compare elementwise, so a length change is a change.
    /// Wrap composite values in [`ByIdentity`] to compare by pointer instead.
    pub fn on<D: PartialEq + 'static>(value: D) -> Self {
        Deps::On(Box::new(value))
    }
}

impl fmt::Debug for Deps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deps::Always => f.write_str("Always"),
            Deps::Once => f.write_str("Once"),
            Deps::On(_) => f.write_str("On(..)"),
        }
    }
}

/// A type-erased dependency value.
pub trait DepValue {
    fn as_any(&self) -> &dyn Any;
    fn same_as(&self, other: &dyn DepValue) -> bool;
}

impl<T: PartialEq + 'static> DepValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn same_as(&self, other: &dyn DepValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }
}

/// Dependency wrapper comparing shared values by identity.
pub struct ByIdentity<T: ?Sized>(pub Rc<T>);

impl<T: ?Sized> PartialEq for ByIdentity<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: ?Sized> Clone for ByIdentity<T> {
    fn clone(&self) -> Self {
        ByIdentity(Rc::clone(&self.0))
    }
}

/// Callback run before an effect re-runs or when its owner is torn down.
pub struct Cleanup(Box<dyn FnOnce() -> Result<(), EffectError>>);

impl Cleanup {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Box::new(move || {
            f();
            Ok(())
        }))
    }

    /// A cleanup that can fail.
    pub fn fallible(f: impl FnOnce() -> Result<(), EffectError> + 'static) -> Self {
        Self(Box::new(f))
    }

    pub fn run(self) -> Result<(), EffectError> {
        (self.0)()
    }
}

type EffectBody = Box<dyn FnOnce() -> Result<Option<Cleanup>, EffectError>>;

/// Storage for effect dependencies and cleanup function.
#[derive(Default)]
struct EffectSlot {
    last_deps: Option<Box<dyn DepValue>>,
    cleanup: Option<Cleanup>,
    has_run: bool,
}

impl EffectSlot {
    fn should_run(&self, deps: &Deps) -> bool {
        match deps {
            Deps::Always => true,
            Deps::Once => !self.has_run,
            Deps::On(next) => match &self.last_deps {
                Some(previous) => !(**previous).same_as(&**next),
                None => true,
            },
        }
    }
}

#[derive(Clone, Default)]
struct EffectHandle(Rc<RefCell<EffectSlot>>);

impl SlotHooks for EffectHandle {
    fn teardown(&self) -> Result<(), EffectError> {
        let cleanup = self.0.borrow_mut().cleanup.take();
        match cleanup {
            Some(cleanup) => cleanup.run(),
            None => Ok(()),
        }
    }
}

/// An effect queued during render, run at commit.
pub(crate) struct PendingEffect {
    id: HookId,
    slot: EffectHandle,
    deps: Deps,
    body: EffectBody,
}

impl PendingEffect {
    fn run(self) -> Result<(), EffectError> {
        let previous = {
            let mut slot = self.slot.0.borrow_mut();
            slot.has_run = true;
            if let Deps::On(value) = self.deps {
                slot.last_deps = Some(value);
            }
            slot.cleanup.take()
        };

        if let Some(cleanup) = previous {
            cleanup.run()?;
        }

        tracing::trace!(slot = %self.id, "running effect");
        let cleanup = (self.body)()?;
        self.slot.0.borrow_mut().cleanup = cleanup;
        Ok(())
    }
}

/// Work produced by a render pass, applied once the output is accepted.
pub(crate) struct Commit {
    removed: Vec<(HookMeta, Rc<dyn SlotHooks>)>,
    effects: Vec<PendingEffect>,
}

impl Commit {
    /// Tear down detached slots, then run queued effects in order.
    ///
    /// Stops at the first failing effect; effects after it stay unrecorded and
    /// are re-evaluated on the next render.
    pub(crate) fn apply(self) -> Result<(), EffectError> {
        teardown_all(self.removed)?;
        for effect in self.effects {
            effect.run()?;
        }
        Ok(())
    }
}

/// Run every teardown, logging failures and returning the first.
pub(crate) fn teardown_all(slots: Vec<(HookMeta, Rc<dyn SlotHooks>)>) -> Result<(), EffectError> {
    let mut first_error = None;
    for (meta, slot) in slots {
        if let Err(err) = slot.teardown() {
            tracing::error!(
                slot = %meta.id,
                hook = meta.hook_type,
                location = %meta.location,
                "cleanup failed: {}",
                err
            );
            first_error.get_or_insert(err);
        }
    }
    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[track_caller]
fn register_effect(hook_type: &'static str, body: EffectBody, deps: Deps) {
    let (id, slot) = use_slot(hook_type, |_| {
        let handle = EffectHandle::default();
        let lifecycle: Rc<dyn SlotHooks> = Rc::new(handle.clone());
        (handle, Some(lifecycle))
    });

    if !slot.0.borrow().should_run(&deps) {
        tracing::trace!(slot = %id, "effect dependencies unchanged, skipping");
        return;
    }

    active_registry(hook_type).borrow_mut().enqueue(PendingEffect {
        id,
        slot,
        deps,
        body,
    });
}

/// Run a side effect after render when dependencies change.
///
/// # Example
///
/// ```ignore
/// fn app(_: &()) -> String {
///     let count = use_cell(|| 0);
///     let value = count.get();
///     use_effect(move || println!("Count changed to: {value}"), Deps::on(value));
///     value.to_string()
/// }
/// ```
#[track_caller]
pub fn use_effect<F>(effect_fn: F, deps: Deps)
where
    F: FnOnce() + 'static,
{
    register_effect(
        "use_effect",
        Box::new(move || {
            effect_fn();
            Ok(None)
        }),
        deps,
    );
}

/// Run a side effect with a cleanup function when dependencies change.
///
/// The cleanup runs before the next run of this effect and when the
/// component is torn down.
///
/// ```ignore
/// use_effect_cleanup(move || {
///     let subscription = subscribe(id);
///     move || subscription.unsubscribe()
/// }, Deps::on(id));
/// ```
#[track_caller]
pub fn use_effect_cleanup<F, C>(effect_fn: F, deps: Deps)
where
    F: FnOnce() -> C + 'static,
    C: FnOnce() + 'static,
{
    register_effect(
        "use_effect",
        Box::new(move || Ok(Some(Cleanup::new(effect_fn())))),
        deps,
    );
}

/// Run a side effect that may fail.
///
/// A failure is returned to the host from the commit that ran the effect.
#[track_caller]
pub fn use_fallible_effect<F>(effect_fn: F, deps: Deps)
where
    F: FnOnce() -> Result<Option<Cleanup>, EffectError> + 'static,
{
    register_effect("use_effect", Box::new(effect_fn), deps);
}

/// Run a side effect only once when the component mounts.
///
/// The returned cleanup runs when the component is torn down.
#[track_caller]
pub fn use_mount<F, C>(effect_fn: F)
where
    F: FnOnce() -> C + 'static,
    C: FnOnce() + 'static,
{
    use_effect_cleanup(effect_fn, Deps::Once);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CapturedLogs;
    use std::cell::Cell;

    fn registry() -> Rc<RefCell<HookRegistry>> {
        Rc::new(RefCell::new(HookRegistry::new(Invalidator::new())))
    }

    fn render<R>(registry: &Rc<RefCell<HookRegistry>>, f: impl FnOnce() -> R) -> R {
        let (output, commit) = render_pass(registry, f);
        commit.apply().expect("commit failed");
        output
    }

    type Log = Rc<RefCell<Vec<String>>>;

    fn logging_effect(log: &Log, dep: i32) {
        let log_body = Rc::clone(log);
        use_effect_cleanup(
            move || {
                log_body.borrow_mut().push(format!("run {dep}"));
                let log_cleanup = Rc::clone(&log_body);
                move || log_cleanup.borrow_mut().push(format!("cleanup {dep}"))
            },
            Deps::on(dep),
        );
    }

    fn counter_component() -> StateCell<i32> {
        use_cell(|| 42)
    }

    fn expensive_component(calls: &Rc<Cell<u32>>) -> StateCell<Vec<u8>> {
        let calls = Rc::clone(calls);
        use_cell(move || {
            calls.set(calls.get() + 1);
            vec![0u8; 16]
        })
    }

    fn keyed_component(keys: &[&'static str]) -> Vec<StateCell<String>> {
        keys.iter()
            .map(|key| with_key(key, || use_cell(|| key.to_string())))
            .collect()
    }

    fn typed_component<T: Clone + 'static>(value: T) -> StateCell<T> {
        with_key("same", || use_cell(|| value))
    }

    #[test]
    fn use_cell_persists_across_renders() {
        let reg = registry();

        let cell = render(&reg, counter_component);
        assert_eq!(cell.get(), 42);
        cell.set(100);

        let cell = render(&reg, counter_component);
        assert_eq!(cell.get(), 100);
    }

    #[test]
    fn lazy_initializer_runs_only_on_first_render() {
        let reg = registry();
        let calls = Rc::new(Cell::new(0));

        for _ in 0..3 {
            render(&reg, || expensive_component(&calls));
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn render_sees_value_from_start_of_pass() {
        fn component() -> (i32, i32, StateCell<i32>) {
            let cell = use_cell(|| 1);
            let before = cell.get();
            cell.update(|n| n * 10);
            (before, cell.get(), cell)
        }

        let reg = registry();
        let (_, _, cell) = render(&reg, component);
        cell.set(2);

        let (before, after, cell) = render(&reg, component);
        assert_eq!((before, after), (2, 2));
        assert_eq!(cell.latest(), 20);
    }

    #[test]
    fn use_ref_persists_without_invalidating() {
        fn component() -> RefHandle<i32> {
            use_ref(|| 0)
        }

        let invalidator = Invalidator::new();
        let reg = Rc::new(RefCell::new(HookRegistry::new(Rc::clone(&invalidator))));

        let handle = render(&reg, component);
        *handle.borrow_mut() = 42;
        assert!(!invalidator.is_dirty());

        let handle = render(&reg, component);
        assert_eq!(*handle.borrow(), 42);
    }

    #[test]
    fn effect_reruns_only_when_deps_change() {
        let reg = registry();
        let log: Log = Rc::default();

        for dep in [1, 1, 2, 2, 3] {
            render(&reg, || logging_effect(&log, dep));
        }

        assert_eq!(
            *log.borrow(),
            ["run 1", "cleanup 1", "run 2", "cleanup 2", "run 3"]
        );
    }

    #[test]
    fn effects_run_after_render_in_registration_order() {
        let reg = registry();
        let log: Log = Rc::default();

        let log_render = Rc::clone(&log);
        let (_, commit) = render_pass(&reg, move || {
            for name in ["first", "second", "third"] {
                let log = Rc::clone(&log_render);
                use_effect(move || log.borrow_mut().push(name.to_string()), Deps::Once);
            }
            log_render.borrow_mut().push("rendered".to_string());
        });
        assert_eq!(*log.borrow(), ["rendered"]);

        commit.apply().unwrap();
        assert_eq!(*log.borrow(), ["rendered", "first", "second", "third"]);
    }

    #[test]
    fn always_and_once_dependencies() {
        let reg = registry();
        let always = Rc::new(Cell::new(0));
        let once = Rc::new(Cell::new(0));

        for _ in 0..3 {
            let always = Rc::clone(&always);
            let once = Rc::clone(&once);
            render(&reg, move || {
                use_effect(move || always.set(always.get() + 1), Deps::Always);
                use_effect(move || once.set(once.get() + 1), Deps::Once);
            });
        }

        assert_eq!(always.get(), 3);
        assert_eq!(once.get(), 1);
    }

    #[test]
    fn dependency_length_change_is_a_change() {
        let reg = registry();
        let runs = Rc::new(Cell::new(0));

        for deps in [vec![1, 2], vec![1, 2], vec![1, 2, 3], vec![1, 2, 3]] {
            let runs = Rc::clone(&runs);
            render(&reg, move || {
                use_effect(move || runs.set(runs.get() + 1), Deps::on(deps));
            });
        }
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn by_identity_compares_pointers() {
        let reg = registry();
        let runs = Rc::new(Cell::new(0));
        let shared = Rc::new(vec![1, 2, 3]);

        let inputs = [
            Rc::clone(&shared),
            Rc::clone(&shared),
            Rc::new(vec![1, 2, 3]),
        ];
        for value in inputs {
            let runs = Rc::clone(&runs);
            render(&reg, move || {
                use_effect(move || runs.set(runs.get() + 1), Deps::on(ByIdentity(value)));
            });
        }
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn conditional_hook_is_torn_down_when_skipped() {
        let reg = registry();
        let log: Log = Rc::default();

        for show in [true, true, false] {
            let log = Rc::clone(&log);
            render(&reg, move || {
                let _always_here = use_cell(|| "stable");
                if show {
                    use_mount(move || {
                        log.borrow_mut().push("mounted".to_string());
                        let log = Rc::clone(&log);
                        move || log.borrow_mut().push("unmounted".to_string())
                    });
                }
            });
        }

        assert_eq!(*log.borrow(), ["mounted", "unmounted"]);
        assert_eq!(reg.borrow().hook_count(), 1);
    }

    #[test]
    fn keyed_slots_follow_their_key() {
        let reg = registry();

        let cells = render(&reg, || keyed_component(&["a", "b"]));
        cells[0].set("a!".to_string());

        let values: Vec<String> = render(&reg, || keyed_component(&["b", "a"]))
            .iter()
            .map(StateCell::get)
            .collect();
        assert_eq!(values, ["b", "a!"]);
    }

    #[test]
    fn duplicate_sibling_key_warns_and_falls_back_to_call_order() {
        let logs = CapturedLogs::default();
        let reg = registry();
        let cells = logs.capture(tracing::Level::WARN, || {
            render(&reg, || keyed_component(&["a", "a"]))
        });
        cells[0].set("first".to_string());
        assert_eq!(cells[1].latest(), "a");

        let output = logs.contents();
        assert!(output.contains("duplicate key"));
        assert_eq!(output.matches("duplicate key").count(), 1);
    }

    #[test]
    fn repeated_calls_at_one_site_get_distinct_slots() {
        let reg = registry();

        let values = render(&reg, || {
            (0..3).map(|i| use_cell(move || i).get()).collect::<Vec<_>>()
        });
        assert_eq!(values, [0, 1, 2]);
        assert_eq!(reg.borrow().hook_count(), 3);
    }

    #[test]
    fn failing_effect_is_reported_and_stops_commit() {
        let reg = registry();
        let later = Rc::new(Cell::new(false));

        let later_clone = Rc::clone(&later);
        let (_, commit) = render_pass(&reg, move || {
            use_fallible_effect(|| Err(EffectError::new("nope")), Deps::Once);
            use_effect(move || later_clone.set(true), Deps::Once);
        });

        assert_eq!(commit.apply(), Err(EffectError::new("nope")));
        assert!(!later.get());
    }

    #[test]
    fn debug_info_lists_slots_in_creation_order() {
        let reg = registry();
        render(&reg, || {
            let _ = use_cell(|| 0u8);
            let _ = use_ref(|| "r");
            use_effect(|| {}, Deps::Once);
        });

        let kinds: Vec<_> = reg
            .borrow()
            .debug_info()
            .iter()
            .map(|meta| meta.hook_type)
            .collect();
        assert_eq!(kinds, ["use_cell", "use_ref", "use_effect"]);
    }

    #[test]
    #[should_panic(expected = "outside of render")]
    fn hook_outside_render_panics() {
        let _ = use_cell(|| 0);
    }

    #[test]
    #[should_panic(expected = "Hook type changed")]
    fn slot_type_change_panics() {
        let reg = registry();
        render(&reg, || {
            typed_component(0);
        });
        render(&reg, || {
            typed_component("text");
        });
    }
}

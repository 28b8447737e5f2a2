//! Asynchronous resources: data loaded by a future, tracked through
//! `Idle -> Loading -> Success | Failure`.
//!
//! Every load carries a token. A completion whose token is no longer the
//! current one is dropped, so an older request finishing late never
//! overwrites the result of a newer one. Loads are not cancelled, only
//! ignored.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use serde::de::DeserializeOwned;

use crate::cell::StateCell;
use crate::error::FetchError;
use crate::fetch::Fetcher;
use crate::hooks::{Deps, hook_scope, use_cell, use_effect, use_mount, use_ref};

/// Where a resource is in its load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResourcePhase {
    #[default]
    Idle,
    Loading,
    Success,
    Failure,
}

/// Snapshot of a resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
    /// Last successfully loaded value. Kept while reloading and on failure.
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<FetchError>,
    pub phase: ResourcePhase,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
            phase: ResourcePhase::Idle,
        }
    }
}

type Loader<K, T> = Rc<dyn Fn(&K) -> LocalBoxFuture<'static, Result<T, FetchError>>>;

trait ResourceControl {
    fn start(&self);
    fn reset(&self);
}

struct Driver<K, T> {
    this: Weak<Driver<K, T>>,
    key: RefCell<K>,
    loader: RefCell<Loader<K, T>>,
    state: StateCell<ResourceState<T>>,
    token: Cell<u64>,
    destroyed: Cell<bool>,
}

impl<K: Clone + 'static, T: Clone + 'static> Driver<K, T> {
    fn new(key: K, loader: Loader<K, T>, state: StateCell<ResourceState<T>>) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            key: RefCell::new(key),
            loader: RefCell::new(loader),
            state,
            token: Cell::new(0),
            destroyed: Cell::new(false),
        })
    }

    fn complete(&self, token: u64, result: Result<T, FetchError>) {
        if self.destroyed.get() {
            tracing::trace!(token, "completion after teardown ignored");
            return;
        }
        if token != self.token.get() {
            tracing::trace!(token, current = self.token.get(), "stale completion ignored");
            return;
        }

        match result {
            Ok(data) => self.state.set(ResourceState {
                data: Some(data),
                loading: false,
                error: None,
                phase: ResourcePhase::Success,
            }),
            Err(error) => {
                tracing::debug!(token, "load failed: {}", error);
                self.state.update(move |previous| ResourceState {
                    data: previous.data.clone(),
                    loading: false,
                    error: Some(error),
                    phase: ResourcePhase::Failure,
                })
            }
        }
    }

    fn destroy(&self) {
        self.destroyed.set(true);
    }
}

impl<K: Clone + 'static, T: Clone + 'static> ResourceControl for Driver<K, T> {
    fn start(&self) {
        if self.destroyed.get() {
            return;
        }
        let token = self.token.get() + 1;
        self.token.set(token);

        self.state.update(|previous| ResourceState {
            data: previous.data.clone(),
            loading: true,
            error: None,
            phase: ResourcePhase::Loading,
        });

        let key = self.key.borrow().clone();
        let loader = Rc::clone(&self.loader.borrow());
        let future = loader(&key);
        let this = self.this.clone();
        tokio::task::spawn_local(async move {
            let result = future.await;
            if let Some(driver) = this.upgrade() {
                driver.complete(token, result);
            }
        });
    }

    fn reset(&self) {
        self.token.set(self.token.get() + 1);
        self.state.set(ResourceState::default());
    }
}

/// Handle to an asynchronous resource.
pub struct Resource<T> {
    state: ResourceState<T>,
    cell: StateCell<ResourceState<T>>,
    control: Rc<dyn ResourceControl>,
}

/// Load a value for `key` with `loader`, reloading whenever `key` changes.
///
/// The first load starts when the component commits its first render. The
/// latest `loader` is always used, so it may capture per-render values.
/// After teardown every completion is a no-op.
///
/// Loads run as tokio local tasks: mount the component inside a
/// [`tokio::task::LocalSet`].
#[track_caller]
pub fn use_resource<K, T, F>(key: K, loader: F) -> Resource<T>
where
    K: Clone + PartialEq + 'static,
    T: Clone + 'static,
    F: Fn(&K) -> LocalBoxFuture<'static, Result<T, FetchError>> + 'static,
{
    hook_scope(|| {
        let cell = use_cell(ResourceState::default);
        let loader: Loader<K, T> = Rc::new(loader);
        let driver = use_ref(|| Driver::new(key.clone(), Rc::clone(&loader), cell.clone())).get();

        *driver.loader.borrow_mut() = loader;
        *driver.key.borrow_mut() = key.clone();

        let starter = Rc::clone(&driver);
        use_effect(move || starter.start(), Deps::on(key));

        let guard = Rc::clone(&driver);
        use_mount(move || move || guard.destroy());

        Resource {
            state: cell.get(),
            cell,
            control: driver,
        }
    })
}

/// Fetch `url` and decode the JSON body into `T`.
///
/// A non-2xx status becomes [`FetchError::Http`] and an undecodable body
/// [`FetchError::Decode`].
///
/// ```ignore
/// let user = use_fetch::<User>(&fetcher, format!("/users/{id}"));
/// if let Some(user) = user.data() { /* ... */ }
/// ```
#[track_caller]
pub fn use_fetch<T>(fetcher: &Rc<dyn Fetcher>, url: impl Into<String>) -> Resource<T>
where
    T: DeserializeOwned + Clone + 'static,
{
    let fetcher = Rc::clone(fetcher);
    use_resource(url.into(), move |url: &String| {
        let request = fetcher.request(url);
        async move { request.await?.json() }.boxed_local()
    })
}

impl<T: Clone> Resource<T> {
    /// Loaded data as of this render.
    pub fn data(&self) -> Option<&T> {
        self.state.data.as_ref()
    }

    pub fn loading(&self) -> bool {
        self.state.loading
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.state.error.as_ref()
    }

    pub fn phase(&self) -> ResourcePhase {
        self.state.phase
    }

    /// The whole state as of this render.
    pub fn state(&self) -> &ResourceState<T> {
        &self.state
    }

    /// The latest state, including changes not yet rendered.
    pub fn current(&self) -> ResourceState<T> {
        self.cell.latest()
    }

    /// Start a new load for the current key. Stale data stays visible until
    /// it completes.
    pub fn refetch(&self) {
        self.control.start();
    }

    /// Back to idle with no data. An in-flight load is ignored when it
    /// completes.
    pub fn reset(&self) {
        self.control.reset();
    }
}

impl<T: Clone> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            cell: self.cell.clone(),
            control: Rc::clone(&self.control),
        }
    }
}

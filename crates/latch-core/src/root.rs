//! Root - the host that mounts a component and drives its render passes.
//!
//! A component is any `FnMut(&P) -> O`. The root invokes it, accepts its
//! output, then commits the effects queued during that render. Writes to the
//! component's cells mark the root dirty; [`Root::flush`] re-renders until the
//! component settles.
//!
//! ```ignore
//! let mut root = Root::mount((), |_: &()| {
//!     let clicks = use_counter(0);
//!     format!("clicked {} times", clicks.value())
//! })?;
//!
//! assert_eq!(root.output(), "clicked 0 times");
//! ```
//!
//! Primitives that spawn async work (fetches, debounce timers) must be
//! mounted inside a [`tokio::task::LocalSet`].

use std::cell::RefCell;
use std::rc::Rc;

use crate::cell::Invalidator;
use crate::error::HookError;
use crate::hooks::{self, HookMeta, HookRegistry};

/// Configuration for a mounted root.
#[derive(Debug, Clone)]
pub struct RootConfig {
    /// Name used in logs and errors.
    pub name: String,
    /// Maximum render passes a single flush may take before giving up.
    pub max_passes: usize,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            name: "root".into(),
            max_passes: 32,
        }
    }
}

impl RootConfig {
    /// Create a config with the given component name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the render pass limit per flush.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes.max(1);
        self
    }
}

/// A mounted component.
pub struct Root<P, O> {
    config: RootConfig,
    registry: Rc<RefCell<HookRegistry>>,
    invalidator: Rc<Invalidator>,
    component: Box<dyn FnMut(&P) -> O>,
    props: P,
    output: O,
    mounted: bool,
}

impl<P: 'static, O: 'static> Root<P, O> {
    /// Mount a component with default configuration.
    pub fn mount(props: P, component: impl FnMut(&P) -> O + 'static) -> Result<Self, HookError> {
        Self::mount_with(RootConfig::default(), props, component)
    }

    /// Mount a component: first render, commit, then settle.
    pub fn mount_with(
        config: RootConfig,
        props: P,
        component: impl FnMut(&P) -> O + 'static,
    ) -> Result<Self, HookError> {
        let invalidator = Invalidator::new();
        let registry = Rc::new(RefCell::new(HookRegistry::new(Rc::clone(&invalidator))));
        let mut component: Box<dyn FnMut(&P) -> O> = Box::new(component);

        let span = tracing::debug_span!("root", component = %config.name);
        let _entered = span.enter();
        tracing::debug!("mounting");
        let (output, commit) = hooks::render_pass(&registry, || component(&props));

        let mut root = Self {
            config,
            registry,
            invalidator,
            component,
            props,
            output,
            mounted: true,
        };
        commit.apply()?;
        root.flush()?;
        Ok(root)
    }
}

impl<P, O> Root<P, O> {
    /// The output of the latest render.
    pub fn output(&self) -> &O {
        &self.output
    }

    /// The arguments the component was last rendered with.
    pub fn props(&self) -> &P {
        &self.props
    }

    /// Number of completed render passes.
    pub fn render_count(&self) -> usize {
        self.registry.borrow().render_count()
    }

    /// Number of live hook slots.
    pub fn hook_count(&self) -> usize {
        self.registry.borrow().hook_count()
    }

    /// Metadata for every live hook slot, in creation order.
    pub fn hooks_debug_info(&self) -> Vec<HookMeta> {
        self.registry.borrow().debug_info()
    }

    /// Whether a cell changed since the last render.
    pub fn is_dirty(&self) -> bool {
        self.invalidator.is_dirty()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn config(&self) -> &RootConfig {
        &self.config
    }

    /// Re-render with new arguments, then settle.
    pub fn set_props(&mut self, props: P) -> Result<(), HookError> {
        self.ensure_mounted()?;
        self.props = props;
        self.render()?;
        self.flush()?;
        Ok(())
    }

    /// Re-render while any owned cell has changed.
    ///
    /// Returns whether at least one render happened.
    pub fn flush(&mut self) -> Result<bool, HookError> {
        self.ensure_mounted()?;
        let mut passes = 0;
        while self.invalidator.is_dirty() {
            if passes == self.config.max_passes {
                return Err(HookError::RenderLoop {
                    name: self.config.name.clone(),
                    passes,
                });
            }
            self.render()?;
            passes += 1;
        }
        Ok(passes > 0)
    }

    /// Wait until an owned cell changes, then flush.
    ///
    /// Used to let async tasks (fetch completions, timers) drive re-renders.
    pub async fn next_update(&mut self) -> Result<(), HookError> {
        self.ensure_mounted()?;
        while !self.invalidator.is_dirty() {
            self.invalidator.changed().await;
        }
        self.flush()?;
        Ok(())
    }

    /// Tear the component down, running every cleanup in registration order.
    ///
    /// Every cleanup is attempted; the first failure is returned.
    pub fn unmount(mut self) -> Result<(), HookError> {
        self.teardown()
    }

    fn span(&self) -> tracing::Span {
        tracing::debug_span!("root", component = %self.config.name)
    }

    fn render(&mut self) -> Result<(), HookError> {
        let span = self.span();
        let _entered = span.enter();
        self.invalidator.take();
        let component = &mut self.component;
        let props = &self.props;
        let (output, commit) = hooks::render_pass(&self.registry, || component(props));
        self.output = output;
        tracing::trace!(render = self.registry.borrow().render_count(), "rendered");
        commit.apply()?;
        Ok(())
    }

    fn teardown(&mut self) -> Result<(), HookError> {
        self.ensure_mounted()?;
        self.mounted = false;
        let span = self.span();
        let _entered = span.enter();
        tracing::debug!("unmounting");
        let slots = self.registry.borrow_mut().drain();
        hooks::teardown_all(slots)?;
        Ok(())
    }

    fn ensure_mounted(&self) -> Result<(), HookError> {
        if self.mounted {
            Ok(())
        } else {
            Err(HookError::Unmounted {
                name: self.config.name.clone(),
            })
        }
    }
}

impl<P, O> Drop for Root<P, O> {
    fn drop(&mut self) {
        if self.mounted {
            // Failures were already logged slot by slot.
            let _ = self.teardown();
        }
    }
}

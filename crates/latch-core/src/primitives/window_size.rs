use std::rc::Rc;

use crate::hooks::{Deps, hook_scope, use_cell, use_effect_cleanup};
use crate::viewport::{Viewport, WindowSize};

/// The latest known viewport size.
///
/// Starts from the viewport's current size, subscribes to resize
/// notifications on first mount and unsubscribes at teardown.
#[track_caller]
pub fn use_window_size(viewport: &Rc<dyn Viewport>) -> WindowSize {
    hook_scope(|| {
        let size = use_cell(|| viewport.size());
        let viewport = Rc::clone(viewport);
        let target = size.clone();

        use_effect_cleanup(
            move || {
                // The size may have changed between render and commit.
                let current = viewport.size();
                if target.latest() != current {
                    target.set(current);
                }

                let subscription = viewport.subscribe(Box::new(move |resized| {
                    if target.latest() != resized {
                        target.set(resized);
                    }
                }));
                move || subscription.unsubscribe()
            },
            Deps::Once,
        );

        size.get()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::root::Root;
    use crate::viewport::SimulatedViewport;

    #[test]
    fn follows_resizes_until_unmounted() {
        let simulated = Rc::new(SimulatedViewport::new(WindowSize::new(800, 600)));
        let viewport: Rc<dyn Viewport> = simulated.clone();

        let mut root = Root::mount(viewport, |viewport: &Rc<dyn Viewport>| {
            use_window_size(viewport)
        })
        .unwrap();
        assert_eq!(*root.output(), WindowSize::new(800, 600));
        assert_eq!(simulated.subscriber_count(), 1);

        simulated.resize(1280, 720);
        root.flush().unwrap();
        assert_eq!(*root.output(), WindowSize::new(1280, 720));

        // Same size again does not re-render
        let renders = root.render_count();
        simulated.resize(1280, 720);
        assert!(!root.flush().unwrap());
        assert_eq!(root.render_count(), renders);

        root.unmount().unwrap();
        assert_eq!(simulated.subscriber_count(), 0);
    }

    #[test]
    fn subscribes_once_across_renders() {
        let simulated = Rc::new(SimulatedViewport::new(WindowSize::new(1, 1)));
        let viewport: Rc<dyn Viewport> = simulated.clone();

        let mut root = Root::mount(viewport.clone(), |viewport: &Rc<dyn Viewport>| {
            use_window_size(viewport)
        })
        .unwrap();
        root.set_props(viewport).unwrap();

        simulated.resize(2, 2);
        root.flush().unwrap();
        assert_eq!(simulated.subscriber_count(), 1);
        assert_eq!(*root.output(), WindowSize::new(2, 2));
    }
}

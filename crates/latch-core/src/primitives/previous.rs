use crate::hooks::{Deps, hook_scope, use_effect, use_ref};

/// The value `current` had during the previous render (`None` on the first).
///
/// The stored value is replaced after each commit, so it always lags by
/// exactly one render.
#[track_caller]
pub fn use_previous<T: Clone + 'static>(current: T) -> Option<T> {
    hook_scope(|| {
        let stored = use_ref(|| None::<T>);
        let previous = stored.get();
        use_effect(move || stored.set(Some(current)), Deps::Always);
        previous
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::use_cell;
    use crate::root::Root;

    #[test]
    fn lags_props_by_one_render() {
        let mut root = Root::mount(1, |n: &i32| use_previous(*n)).unwrap();
        assert_eq!(*root.output(), None);

        root.set_props(2).unwrap();
        assert_eq!(*root.output(), Some(1));

        root.set_props(3).unwrap();
        assert_eq!(*root.output(), Some(2));
    }

    #[test]
    fn tracks_state_driven_renders() {
        let mut root = Root::mount((), |_: &()| {
            let count = use_cell(|| 0);
            (count.get(), use_previous(count.get()), count)
        })
        .unwrap();

        let cell = root.output().2.clone();
        cell.set(7);
        root.flush().unwrap();

        let (now, before, _) = root.output();
        assert_eq!((*now, *before), (7, Some(0)));
    }
}

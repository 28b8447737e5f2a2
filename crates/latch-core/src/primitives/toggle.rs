use crate::cell::StateCell;
use crate::hooks::use_cell;

/// Boolean state with flip and set mutators.
#[derive(Clone, Debug)]
pub struct Toggle {
    value: bool,
    cell: StateCell<bool>,
}

/// Create or retrieve a toggle starting at `initial`.
#[track_caller]
pub fn use_toggle(initial: bool) -> Toggle {
    let cell = use_cell(|| initial);
    Toggle {
        value: cell.get(),
        cell,
    }
}

impl Toggle {
    /// The value for this render.
    pub fn value(&self) -> bool {
        self.value
    }

    pub fn toggle(&self) {
        self.cell.update(|on| !on);
    }

    pub fn set_true(&self) {
        self.cell.update(|_| true);
    }

    pub fn set_false(&self) {
        self.cell.update(|_| false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::root::Root;

    #[test]
    fn toggling_three_times_alternates() {
        let mut root = Root::mount((), |_: &()| use_toggle(false)).unwrap();
        let mut seen = vec![root.output().value()];

        for _ in 0..3 {
            root.output().toggle();
            root.flush().unwrap();
            seen.push(root.output().value());
        }

        assert_eq!(seen, [false, true, false, true]);
    }

    #[test]
    fn flips_in_one_batch_cancel_out() {
        let mut root = Root::mount((), |_: &()| use_toggle(true)).unwrap();
        let toggle = root.output().clone();

        toggle.toggle();
        toggle.toggle();
        root.flush().unwrap();
        assert!(root.output().value());

        toggle.set_false();
        toggle.toggle();
        root.flush().unwrap();
        assert!(root.output().value());

        toggle.set_true();
        toggle.set_false();
        root.flush().unwrap();
        assert!(!root.output().value());
    }
}

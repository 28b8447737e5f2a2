use crate::cell::StateCell;
use crate::hooks::use_cell;

/// Integer counter with step mutators.
#[derive(Clone, Debug)]
pub struct Counter {
    value: i64,
    initial: i64,
    cell: StateCell<i64>,
}

/// Create or retrieve a counter starting at `initial`.
///
/// ```ignore
/// let clicks = use_counter(0);
/// let on_click = {
///     let clicks = clicks.clone();
///     move || clicks.increment()
/// };
/// ```
#[track_caller]
pub fn use_counter(initial: i64) -> Counter {
    let cell = use_cell(|| initial);
    Counter {
        value: cell.get(),
        initial,
        cell,
    }
}

impl Counter {
    /// The value for this render.
    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn increment(&self) {
        self.increment_by(1);
    }

    pub fn decrement(&self) {
        self.increment_by(-1);
    }

    pub fn increment_by(&self, step: i64) {
        self.cell.update(|n| n.saturating_add(step));
    }

    pub fn set(&self, value: i64) {
        self.cell.set(value);
    }

    /// Go back to the value the counter was created with.
    pub fn reset(&self) {
        self.cell.set(self.initial);
    }
}

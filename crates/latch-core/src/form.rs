//! Multi-field form state: one value and at most one error per field.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::cell::StateCell;
use crate::hooks::{hook_scope, use_cell, use_ref};

/// Values and errors of a form, keyed by field.
#[derive(Debug, Clone, PartialEq)]
pub struct FormData<K: Ord, V> {
    pub values: BTreeMap<K, V>,
    pub errors: BTreeMap<K, String>,
}

impl<K: Ord, V> FormData<K, V> {
    pub fn new(values: BTreeMap<K, V>) -> Self {
        Self {
            values,
            errors: BTreeMap::new(),
        }
    }

    pub fn value<Q>(&self, field: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.values.get(field)
    }

    pub fn error<Q>(&self, field: &Q) -> Option<&str>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.errors.get(field).map(String::as_str)
    }

    /// Write a value and clear that field's error.
    pub fn set_value(&mut self, field: K, value: V) {
        self.errors.remove(&field);
        self.values.insert(field, value);
    }

    /// Write an error. The value is left alone.
    pub fn set_error(&mut self, field: K, message: impl Into<String>) {
        self.errors.insert(field, message.into());
    }

    pub fn clear_error<Q>(&mut self, field: &Q)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.errors.remove(field);
    }

    /// True when no field has an error.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Handle to form state held by a component.
pub struct FormState<K: Ord, V> {
    data: FormData<K, V>,
    cell: StateCell<FormData<K, V>>,
    initial: Rc<BTreeMap<K, V>>,
}

/// Create or retrieve form state seeded with `initial` field values.
///
/// No validation is built in: components call [`FormState::set_error`]
/// themselves, and writing a field's value clears its error.
///
/// ```ignore
/// let form = use_form(|| [("email", String::new()), ("name", String::new())]);
/// form.set_value("email", input);
/// if !input.contains('@') {
///     form.set_error("email", "invalid address");
/// }
/// ```
#[track_caller]
pub fn use_form<K, V, I>(initial: impl FnOnce() -> I) -> FormState<K, V>
where
    K: Ord + Clone + 'static,
    V: Clone + 'static,
    I: IntoIterator<Item = (K, V)>,
{
    hook_scope(|| {
        let initial = use_ref(|| Rc::new(initial().into_iter().collect::<BTreeMap<_, _>>())).get();
        let cell = use_cell(|| FormData::new((*initial).clone()));
        FormState {
            data: cell.get(),
            cell,
            initial,
        }
    })
}

impl<K, V> FormState<K, V>
where
    K: Ord + Clone + 'static,
    V: Clone + 'static,
{
    /// All values as of this render.
    pub fn values(&self) -> &BTreeMap<K, V> {
        &self.data.values
    }

    pub fn errors(&self) -> &BTreeMap<K, String> {
        &self.data.errors
    }

    pub fn value<Q>(&self, field: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.data.value(field)
    }

    pub fn error<Q>(&self, field: &Q) -> Option<&str>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.data.error(field)
    }

    pub fn is_valid(&self) -> bool {
        self.data.is_valid()
    }

    /// Whether the values differ from the initial ones.
    pub fn is_dirty(&self) -> bool
    where
        V: PartialEq,
    {
        self.data.values != *self.initial
    }

    pub fn set_value(&self, field: impl Into<K>, value: V) {
        let field = field.into();
        self.cell.update(move |data| {
            let mut next = data.clone();
            next.set_value(field, value);
            next
        });
    }

    pub fn set_error(&self, field: impl Into<K>, message: impl Into<String>) {
        let field = field.into();
        let message = message.into();
        self.cell.update(move |data| {
            let mut next = data.clone();
            next.set_error(field, message);
            next
        });
    }

    pub fn clear_error(&self, field: impl Into<K>) {
        let field = field.into();
        self.cell.update(move |data| {
            let mut next = data.clone();
            next.clear_error(&field);
            next
        });
    }

    /// Restore the initial values and clear every error.
    pub fn reset(&self) {
        self.cell.set(FormData::new((*self.initial).clone()));
    }
}

impl<K: Ord + Clone, V: Clone> Clone for FormState<K, V> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            cell: self.cell.clone(),
            initial: Rc::clone(&self.initial),
        }
    }
}

use std::time::Duration;

use crate::hooks::{Deps, hook_scope, use_cell, use_effect_cleanup};

/// A copy of `source` that only follows it once it has been stable for
/// `delay`.
///
/// Every change of `source` cancels the pending timer and starts a new one,
/// so a burst of changes is observed only as its final value. The pending
/// timer is cancelled when the component is torn down.
///
/// Timers run as tokio local tasks: mount the component inside a
/// [`tokio::task::LocalSet`].
///
/// ```ignore
/// let query = use_debounced(props.search_text.clone(), Duration::from_millis(300));
/// let results = use_fetch::<Vec<Hit>>(&fetcher, format!("/search?q={query}"));
/// ```
#[track_caller]
pub fn use_debounced<T>(source: T, delay: Duration) -> T
where
    T: Clone + PartialEq + 'static,
{
    hook_scope(|| {
        let debounced = use_cell(|| source.clone());
        let target = debounced.clone();
        let pending = source.clone();

        use_effect_cleanup(
            move || {
                let timer = (target.latest() != pending).then(|| {
                    tokio::task::spawn_local(async move {
                        tokio::time::sleep(delay).await;
                        target.set(pending);
                    })
                });
                move || {
                    if let Some(timer) = timer {
                        timer.abort();
                    }
                }
            },
            Deps::on((source, delay)),
        );

        debounced.get()
    })
}

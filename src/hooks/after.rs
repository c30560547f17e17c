//! `use_after`: effects that run once the DOM has been committed.

use std::any::Any;

use super::scope::{Claim, Scope};
use super::store::{Cleanup, EffectSlot, HookKind, HookSlot, PendingEffect};

/// What an effect may return: nothing, or a cleanup closure.
///
/// The cleanup runs before the next run of the same effect and when the
/// component unmounts.
pub trait Teardown: 'static {
    fn into_cleanup(self) -> Option<Cleanup>;
}

impl Teardown for () {
    fn into_cleanup(self) -> Option<Cleanup> {
        None
    }
}

impl<F: FnOnce() + 'static> Teardown for F {
    fn into_cleanup(self) -> Option<Cleanup> {
        Some(Box::new(self))
    }
}

impl<F: FnOnce() + 'static> Teardown for Option<F> {
    fn into_cleanup(self) -> Option<Cleanup> {
        self.map(|f| Box::new(f) as Cleanup)
    }
}

/// Run `effect` after every commit of this component.
pub fn use_after<R, E>(cx: &mut Scope<'_>, effect: E)
where
    R: Teardown,
    E: FnOnce() -> R + 'static,
{
    schedule(cx, None::<()>, effect);
}

/// Run `effect` after the first commit and whenever `deps` changes.
///
/// Passing `()` as deps runs the effect only once, after mount.
pub fn use_after_with<D, R, E>(cx: &mut Scope<'_>, deps: D, effect: E)
where
    D: PartialEq + 'static,
    R: Teardown,
    E: FnOnce() -> R + 'static,
{
    schedule(cx, Some(deps), effect);
}

fn schedule<D, R, E>(cx: &mut Scope<'_>, deps: Option<D>, effect: E)
where
    D: PartialEq + 'static,
    R: Teardown,
    E: FnOnce() -> R + 'static,
{
    let slot = match cx.claim(HookKind::Effect) {
        Claim::Fresh(slot) => {
            cx.fill(HookSlot::Effect(EffectSlot {
                deps: deps.map(|d| Box::new(d) as Box<dyn Any>),
                cleanup: None,
            }));
            slot
        }
        Claim::Existing(slot) => {
            let Some(HookSlot::Effect(state)) = cx.slot_mut(slot) else {
                return;
            };
            let changed = match (&state.deps, &deps) {
                (Some(old), Some(new)) => old.downcast_ref::<D>() != Some(new),
                _ => true,
            };
            if !changed {
                return;
            }
            state.deps = deps.map(|d| Box::new(d) as Box<dyn Any>);
            slot
        }
        Claim::Rejected(_) => return,
    };
    cx.queue(PendingEffect {
        slot,
        run: Box::new(move || effect().into_cleanup()),
    });
}

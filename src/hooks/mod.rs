//! Hooks: per-component state, post-commit effects, and anchors.
//!
//! Every hook takes the [`Scope`] of the component being rendered and claims
//! the next slot of the component's hook store. The number, order and kind
//! of hook calls must be identical on every render of a component; any
//! divergence aborts the pass with
//! [`Error::HookOrderViolation`](crate::Error::HookOrderViolation).

pub mod after;
pub mod anchor;
pub mod scope;
pub mod signal;
pub(crate) mod store;

pub use after::{use_after, use_after_with, Teardown};
pub use anchor::{use_anchor, use_node_ref, Anchor, NodeRef};
pub use scope::Scope;
pub use signal::{use_signal, use_signal_with, Setter};
pub use store::Cleanup;

#[cfg(test)]
mod tests {
    use super::store::{HookStore, PendingEffect};
    use super::*;
    use crate::dom::Document;
    use crate::error::{Error, Result};
    use crate::runtime::RuntimeInner;
    use crate::tile::TileId;
    use std::cell::Cell;
    use std::rc::{Rc, Weak};

    /// Run one render pass of a fake component against `store`.
    fn render(
        store: &mut HookStore,
        body: impl FnOnce(&mut Scope<'_>),
    ) -> (Result<()>, Vec<PendingEffect>) {
        let document = Document::new();
        let runtime: Weak<RuntimeInner> = Weak::new();
        let mut effects = Vec::new();
        let mut cx = Scope::new(
            TileId::default(),
            "Probe",
            &[],
            store,
            &mut effects,
            &runtime,
            &document,
        );
        body(&mut cx);
        let outcome = cx.finish();
        (outcome, effects)
    }

    fn run_all(effects: Vec<PendingEffect>) -> usize {
        let count = effects.len();
        for effect in effects {
            let _ = (effect.run)();
        }
        count
    }

    #[test]
    fn signal_keeps_first_value() {
        let mut store = HookStore::default();
        let (ok, _) = render(&mut store, |cx| {
            let (value, _) = use_signal(cx, 1);
            assert_eq!(value, 1);
        });
        ok.unwrap();
        let (ok, _) = render(&mut store, |cx| {
            let (value, _) = use_signal(cx, 99);
            assert_eq!(value, 1);
        });
        ok.unwrap();
    }

    #[test]
    fn lazy_initializer_runs_once() {
        let calls = Cell::new(0);
        let mut store = HookStore::default();
        for _ in 0..3 {
            let (ok, _) = render(&mut store, |cx| {
                use_signal_with(cx, || {
                    calls.set(calls.get() + 1);
                    String::from("x")
                });
            });
            ok.unwrap();
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn detached_setter_is_a_noop() {
        let mut store = HookStore::default();
        let mut setter = None;
        let (ok, _) = render(&mut store, |cx| {
            setter = Some(use_signal(cx, 0).1);
        });
        ok.unwrap();
        let setter = setter.unwrap();
        assert!(setter.set(5).is_ok());
        assert_eq!(setter.get(), None);
    }

    #[test]
    fn effect_dependency_gating() {
        let mut store = HookStore::default();
        let mut queued = Vec::new();
        for deps in [1, 1, 2, 2, 3] {
            let (ok, effects) = render(&mut store, |cx| use_after_with(cx, deps, || {}));
            ok.unwrap();
            queued.push(run_all(effects));
        }
        assert_eq!(queued, vec![1, 0, 1, 0, 1]);
    }

    #[test]
    fn unit_deps_run_once_and_no_deps_always() {
        let mut store = HookStore::default();
        let mut queued = Vec::new();
        for _ in 0..3 {
            let (ok, effects) = render(&mut store, |cx| {
                use_after_with(cx, (), || {});
                use_after(cx, || {});
            });
            ok.unwrap();
            queued.push(run_all(effects));
        }
        assert_eq!(queued, vec![2, 1, 1]);
    }

    #[test]
    fn effects_return_cleanups() {
        let mut store = HookStore::default();
        let cleaned = Rc::new(Cell::new(false));
        let flag = cleaned.clone();
        let (ok, effects) = render(&mut store, move |cx| {
            use_after(cx, move || move || flag.set(true));
        });
        ok.unwrap();
        let effect = effects.into_iter().next().unwrap();
        let cleanup = (effect.run)().unwrap();
        assert!(!cleaned.get());
        cleanup();
        assert!(cleaned.get());
    }

    #[test]
    fn anchor_identity_is_stable() {
        let mut store = HookStore::default();
        let mut first = None;
        let (ok, _) = render(&mut store, |cx| {
            let anchor = use_anchor(cx, 0_u32);
            anchor.set(7);
            first = Some(anchor);
        });
        ok.unwrap();
        let (ok, _) = render(&mut store, |cx| {
            let anchor = use_anchor(cx, 0_u32);
            assert_eq!(anchor.get(), 7);
            assert!(anchor.ptr_eq(first.as_ref().unwrap()));
        });
        ok.unwrap();
    }

    #[test]
    fn extra_hook_is_a_violation() {
        let mut store = HookStore::default();
        render(&mut store, |cx| {
            use_signal(cx, 0);
        })
        .0
        .unwrap();
        let (err, _) = render(&mut store, |cx| {
            use_signal(cx, 0);
            use_signal(cx, 0);
        });
        assert!(matches!(
            err,
            Err(Error::HookOrderViolation { component: "Probe", slot: 1, .. })
        ));
    }

    #[test]
    fn missing_hook_is_a_violation() {
        let mut store = HookStore::default();
        render(&mut store, |cx| {
            use_signal(cx, 0);
            use_anchor(cx, ());
        })
        .0
        .unwrap();
        let (err, _) = render(&mut store, |cx| {
            use_signal(cx, 0);
        });
        assert!(matches!(
            err,
            Err(Error::HookOrderViolation { slot: 1, reason: "fewer hooks than the previous render", .. })
        ));
    }

    #[test]
    fn swapped_kinds_are_a_violation() {
        let mut store = HookStore::default();
        render(&mut store, |cx| {
            use_signal(cx, 0);
            use_after(cx, || {});
        })
        .0
        .unwrap();
        let (err, effects) = render(&mut store, |cx| {
            use_after(cx, || {});
            use_signal(cx, 0);
        });
        assert!(matches!(
            err,
            Err(Error::HookOrderViolation { slot: 0, reason: "hook kind changed between renders", .. })
        ));
        assert!(effects.is_empty());
    }

    #[test]
    fn changed_signal_type_is_a_violation() {
        let mut store = HookStore::default();
        render(&mut store, |cx| {
            use_signal(cx, 0_i32);
        })
        .0
        .unwrap();
        let (err, _) = render(&mut store, |cx| {
            let (value, _) = use_signal(cx, String::from("fallback"));
            assert_eq!(value, "fallback");
        });
        assert!(matches!(err, Err(Error::HookOrderViolation { slot: 0, .. })));
    }
}

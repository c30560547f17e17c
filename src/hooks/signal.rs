//! `use_signal`: state that re-renders its component when set.

use std::fmt;
use std::marker::PhantomData;
use std::rc::Weak;

use crate::error::Result;
use crate::runtime::RuntimeInner;
use crate::tile::TileId;

use super::scope::{Claim, Scope};
use super::store::{HookKind, HookSlot};

/// Declare a piece of state owned by the current component.
///
/// Returns the current value and a [`Setter`]. The first render stores
/// `initial`; later renders ignore it.
pub fn use_signal<T>(cx: &mut Scope<'_>, initial: T) -> (T, Setter<T>)
where
    T: Clone + PartialEq + 'static,
{
    use_signal_with(cx, || initial)
}

/// Like [`use_signal`], computing the initial value only on first render.
pub fn use_signal_with<T, F>(cx: &mut Scope<'_>, init: F) -> (T, Setter<T>)
where
    T: Clone + PartialEq + 'static,
    F: FnOnce() -> T,
{
    let (slot, value) = match cx.claim(HookKind::Signal) {
        Claim::Fresh(slot) => {
            let value = init();
            cx.fill(HookSlot::Signal(Box::new(value.clone())));
            (slot, value)
        }
        Claim::Existing(slot) => match cx.store().signal::<T>(slot) {
            Some(value) => (slot, value.clone()),
            None => {
                cx.violate(slot, "signal type changed between renders");
                (slot, init())
            }
        },
        Claim::Rejected(slot) => (slot, init()),
    };
    let setter = Setter {
        runtime: cx.runtime(),
        tile: cx.tile(),
        slot,
        _marker: PhantomData,
    };
    (value, setter)
}

// ---------------------------------------------------------------------------
// Setter
// ---------------------------------------------------------------------------

/// Writes a signal and synchronously re-renders the owning component.
///
/// Setters stay valid across renders. Once the component unmounts they
/// become no-ops.
pub struct Setter<T: 'static> {
    runtime: Weak<RuntimeInner>,
    tile: TileId,
    slot: usize,
    _marker: PhantomData<fn(T)>,
}

// Manual impls so we don't require T: Clone/Debug for the setter itself.
impl<T: 'static> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            runtime: self.runtime.clone(),
            tile: self.tile,
            slot: self.slot,
            _marker: PhantomData,
        }
    }
}

impl<T: 'static> fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter")
            .field("tile", &self.tile)
            .field("slot", &self.slot)
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Setter<T> {
    /// Store `next` and re-render, unless it equals the current value.
    ///
    /// Fails with [`RenderInProgress`](crate::Error::RenderInProgress) when
    /// called while a render or commit is running.
    pub fn set(&self, next: T) -> Result<()> {
        let Some(runtime) = self.runtime.upgrade() else {
            return Ok(());
        };
        runtime.write_signal(self.tile, self.slot, move |_| next)
    }

    /// Compute the next value from the current one.
    pub fn update(&self, f: impl FnOnce(&T) -> T) -> Result<()> {
        let Some(runtime) = self.runtime.upgrade() else {
            return Ok(());
        };
        runtime.write_signal(self.tile, self.slot, f)
    }

    /// The current value, or `None` once the component has unmounted or
    /// while it is rendering.
    pub fn get(&self) -> Option<T> {
        self.runtime
            .upgrade()
            .and_then(|runtime| runtime.read_signal(self.tile, self.slot))
    }
}

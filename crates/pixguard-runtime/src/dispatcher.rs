//! Run-time routing of image assignments
//!
//! Rewritten call sites land here. Each dispatch checks the frozen
//! oversized set and hands the assignment either to the registered
//! [`ImageLoader`] or to the widget's own default setter.
//!
//! A thread-local flag marks the dispatch in progress. A loader that ends up
//! assigning through a rewritten call site again on the same thread gets the
//! default assignment immediately, so dispatches never recurse.

use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use pixguard_types::{OversizedSet, ResourceId};
use tracing::debug;

use crate::host::{ImageLoader, ImageView, View};

thread_local! {
    static IN_DISPATCH: Cell<bool> = const { Cell::new(false) };
}

/// Whether the current thread is inside a dispatch
#[must_use]
pub fn in_dispatch() -> bool {
    IN_DISPATCH.with(Cell::get)
}

/// Holds the thread-local flag for one outer dispatch
///
/// Clearing happens on drop, so a panicking loader still releases it.
struct DispatchGuard;

impl DispatchGuard {
    fn enter() -> Option<Self> {
        IN_DISPATCH.with(|flag| {
            if flag.get() {
                None
            } else {
                flag.set(true);
                Some(Self)
            }
        })
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        IN_DISPATCH.with(|flag| flag.set(false));
    }
}

/// How a dispatch was served
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Default setter; id not oversized or no loader registered
    Default,
    /// Registered loader
    Loader,
    /// Default setter applied directly inside an outer dispatch
    Nested,
}

/// Routes assignments of oversized ids to the registered loader
pub struct Dispatcher {
    oversized: OversizedSet,
    loader: ArcSwapOption<Box<dyn ImageLoader>>,
}

impl Dispatcher {
    /// Create a dispatcher for a frozen oversized set
    #[must_use]
    pub fn new(oversized: OversizedSet) -> Self {
        Self {
            oversized,
            loader: ArcSwapOption::empty(),
        }
    }

    /// Create from a generated id list
    #[must_use]
    pub fn from_ids(ids: &[i32]) -> Self {
        Self::new(OversizedSet::from_raw(ids))
    }

    /// Oversized ids
    #[inline]
    #[must_use]
    pub fn oversized(&self) -> &OversizedSet {
        &self.oversized
    }

    /// Check if `id` is routed to the loader when one is registered
    #[inline]
    #[must_use]
    pub fn is_oversized(&self, id: ResourceId) -> bool {
        self.oversized.contains(id)
    }

    /// Register the pluggable loader, replacing any previous one
    pub fn register_loader(&self, loader: impl ImageLoader + 'static) {
        self.loader.store(Some(Arc::new(Box::new(loader))));
        debug!("Registered image loader");
    }

    /// Check if a loader is registered
    #[must_use]
    pub fn has_loader(&self) -> bool {
        self.loader.load().is_some()
    }

    /// Assign an image to `view`
    pub fn dispatch_image(&self, view: &dyn ImageView, id: ResourceId) -> Route {
        let Some(_guard) = DispatchGuard::enter() else {
            view.set_image_resource(id);
            return Route::Nested;
        };
        if self.is_oversized(id) {
            if let Some(loader) = self.loader.load_full() {
                debug!(%id, "Loading oversized image through loader");
                loader.load_image(view, id);
                return Route::Loader;
            }
        }
        view.set_image_resource(id);
        Route::Default
    }

    /// Assign a background to `view`
    pub fn dispatch_background(&self, view: &dyn View, id: ResourceId) -> Route {
        let Some(_guard) = DispatchGuard::enter() else {
            view.set_background_resource(id);
            return Route::Nested;
        };
        if self.is_oversized(id) {
            if let Some(loader) = self.loader.load_full() {
                debug!(%id, "Loading oversized background through loader");
                loader.load_background(view, id);
                return Route::Loader;
            }
        }
        view.set_background_resource(id);
        Route::Default
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("oversized", &self.oversized.len())
            .field("has_loader", &self.has_loader())
            .finish()
    }
}

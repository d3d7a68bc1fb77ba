//! Process-wide dispatcher
//!
//! Rewritten call sites are static calls, so the host needs one dispatcher
//! reachable without a handle. Installation is opt-in and happens at most
//! once.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use pixguard_types::ResourceId;
use tracing::{debug, warn};

use crate::dispatcher::{Dispatcher, Route};
use crate::host::{ImageView, View};

static GLOBAL: OnceCell<Arc<Dispatcher>> = OnceCell::new();

/// Install the process-wide dispatcher
///
/// # Errors
///
/// Returns `dispatcher` back when one is already installed.
pub fn install_global(dispatcher: Arc<Dispatcher>) -> Result<(), Arc<Dispatcher>> {
    GLOBAL.set(dispatcher).map_err(|rejected| {
        warn!("Global dispatcher already installed");
        rejected
    })?;
    debug!("Installed global dispatcher");
    Ok(())
}

/// Process-wide dispatcher, if installed
#[must_use]
pub fn global() -> Option<&'static Arc<Dispatcher>> {
    GLOBAL.get()
}

/// Target of rewritten image assignments
pub fn load_image_resource(view: &dyn ImageView, id: ResourceId) -> Route {
    match global() {
        Some(dispatcher) => dispatcher.dispatch_image(view, id),
        None => {
            view.set_image_resource(id);
            Route::Default
        }
    }
}

/// Target of rewritten background assignments
pub fn load_background_resource(view: &dyn View, id: ResourceId) -> Route {
    match global() {
        Some(dispatcher) => dispatcher.dispatch_background(view, id),
        None => {
            view.set_background_resource(id);
            Route::Default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ImageLoader;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Widget(Mutex<Vec<ResourceId>>);

    impl View for Widget {
        fn set_background_resource(&self, id: ResourceId) {
            self.0.lock().push(id);
        }
    }

    impl ImageView for Widget {
        fn set_image_resource(&self, id: ResourceId) {
            self.0.lock().push(id);
        }
    }

    struct Swallow;

    impl ImageLoader for Swallow {
        fn load_image(&self, _view: &dyn ImageView, _id: ResourceId) {}
        fn load_background(&self, _view: &dyn View, _id: ResourceId) {}
    }

    // The only test in this crate touching the global slot
    #[test]
    fn fallback_then_install_once() {
        let big = ResourceId::new(0x7f08_0001);
        let widget = Widget::default();

        assert_eq!(load_image_resource(&widget, big), Route::Default);
        assert_eq!(load_background_resource(&widget, big), Route::Default);
        assert_eq!(widget.0.lock().len(), 2);

        let dispatcher = Arc::new(Dispatcher::from_ids(&[big.get()]));
        dispatcher.register_loader(Swallow);
        assert!(install_global(dispatcher.clone()).is_ok());
        assert!(install_global(Arc::new(Dispatcher::from_ids(&[]))).is_err());
        assert!(Arc::ptr_eq(global().unwrap(), &dispatcher));

        assert_eq!(load_image_resource(&widget, big), Route::Loader);
        assert_eq!(widget.0.lock().len(), 2);
    }
}

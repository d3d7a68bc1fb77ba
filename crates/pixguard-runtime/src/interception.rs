//! View-factory interception
//!
//! Images assigned declaratively in layout descriptions never pass through
//! a rewritten call site. [`InterceptingFactory`] wraps the host's factory
//! chain and replays `src` and `background` attributes of every created image
//! widget through the dispatcher.

use std::sync::Arc;

use pixguard_types::ResourceId;
use tracing::{debug, warn};

use crate::dispatcher::Dispatcher;
use crate::error::SeamError;
use crate::host::{AttributeSet, View, ViewFactory};

/// Platform attribute namespace
pub const ANDROID_NAMESPACE: &str = "http://schemas.android.com/apk/res/android";
/// Application attribute namespace
pub const RES_AUTO_NAMESPACE: &str = "http://schemas.android.com/apk/res-auto";

const SRC: &str = "src";
const BACKGROUND: &str = "background";

/// Factory wrapper that routes declarative image attributes to a dispatcher
pub struct InterceptingFactory {
    delegates: Vec<Arc<dyn ViewFactory>>,
    dispatcher: Arc<Dispatcher>,
}

impl InterceptingFactory {
    /// Wrap an empty delegate chain
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            delegates: Vec::new(),
            dispatcher,
        }
    }

    /// Append a delegate; earlier delegates are asked first
    #[must_use]
    pub fn with_delegate(mut self, delegate: Arc<dyn ViewFactory>) -> Self {
        self.delegates.push(delegate);
        self
    }

    /// Number of wrapped delegates
    #[inline]
    #[must_use]
    pub fn delegate_count(&self) -> usize {
        self.delegates.len()
    }

    fn replay_attributes(&self, view: &dyn View, attrs: &dyn AttributeSet) {
        let Some(image) = view.as_image_view() else {
            return;
        };
        for namespace in [ANDROID_NAMESPACE, RES_AUTO_NAMESPACE] {
            let src = ResourceId::new(attrs.attribute_resource_value(namespace, SRC, 0));
            if !src.is_none() {
                self.dispatcher.dispatch_image(image, src);
            }
            let background = ResourceId::new(attrs.attribute_resource_value(namespace, BACKGROUND, 0));
            if !background.is_none() {
                self.dispatcher.dispatch_background(view, background);
            }
        }
    }
}

impl ViewFactory for InterceptingFactory {
    fn create_view(
        &self,
        parent: Option<&dyn View>,
        name: &str,
        attrs: &dyn AttributeSet,
    ) -> Option<Box<dyn View>> {
        let view = self
            .delegates
            .iter()
            .find_map(|delegate| delegate.create_view(parent, name, attrs))?;
        self.replay_attributes(view.as_ref(), attrs);
        Some(view)
    }
}

/// Narrow adapter over the host's factory slot
pub trait FactorySeam {
    /// Factory currently installed, if any
    ///
    /// # Errors
    ///
    /// Fails when the host denies access to the slot.
    fn current_factory(&mut self) -> Result<Option<Arc<dyn ViewFactory>>, SeamError>;

    /// Install `factory` in place of the current one
    ///
    /// # Errors
    ///
    /// Fails when the host denies access to the slot; the previous factory
    /// then stays installed.
    fn replace_factory(&mut self, factory: Arc<dyn ViewFactory>) -> Result<(), SeamError>;
}

/// Wrap the seam's current factory with an [`InterceptingFactory`]
///
/// Returns whether the wrapper was installed. Seam failures are logged and
/// leave the original factory in place.
pub fn install_interception(seam: &mut dyn FactorySeam, dispatcher: Arc<Dispatcher>) -> bool {
    let current = match seam.current_factory() {
        Ok(current) => current,
        Err(e) => {
            warn!(error = %e, "Factory interception not installed");
            return false;
        }
    };

    let mut wrapper = InterceptingFactory::new(dispatcher);
    if let Some(current) = current {
        wrapper = wrapper.with_delegate(current);
    }
    let delegates = wrapper.delegate_count();

    match seam.replace_factory(Arc::new(wrapper)) {
        Ok(()) => {
            debug!(delegates, "Installed factory interception");
            true
        }
        Err(e) => {
            warn!(error = %e, "Factory interception not installed");
            false
        }
    }
}

//! Run-time side of the image guard
//!
//! Rewritten call sites and intercepted view factories end up in a
//! [`Dispatcher`], which sends oversized ids to the registered
//! [`ImageLoader`] and everything else to the widget's default setter.
//!
//! # Example
//!
//! ```rust
//! use pixguard_runtime::{Dispatcher, ImageView, Route, View};
//! use pixguard_types::ResourceId;
//!
//! struct Icon;
//! impl View for Icon {
//!     fn set_background_resource(&self, _id: ResourceId) {}
//! }
//! impl ImageView for Icon {
//!     fn set_image_resource(&self, _id: ResourceId) {}
//! }
//!
//! let dispatcher = Dispatcher::from_ids(&[0x7f08_0001]);
//! assert_eq!(dispatcher.dispatch_image(&Icon, ResourceId::new(0x7f08_0001)), Route::Default);
//! ```

mod dispatcher;
mod error;
mod global;
mod host;
mod interception;

pub use dispatcher::{in_dispatch, Dispatcher, Route};
pub use error::SeamError;
pub use global::{global, install_global, load_background_resource, load_image_resource};
pub use host::{AttributeSet, ImageLoader, ImageView, View, ViewFactory};
pub use interception::{
    install_interception, FactorySeam, InterceptingFactory, ANDROID_NAMESPACE, RES_AUTO_NAMESPACE,
};

/// Prelude for common imports
pub mod prelude {
    pub use crate::dispatcher::{Dispatcher, Route};
    pub use crate::host::{AttributeSet, ImageLoader, ImageView, View, ViewFactory};
    pub use crate::interception::{install_interception, FactorySeam, InterceptingFactory};
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

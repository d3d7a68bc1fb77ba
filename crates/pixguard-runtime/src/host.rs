//! Host seams
//!
//! The UI toolkit is reached only through these traits. Views use interior
//! mutability, mirroring a toolkit whose widgets are shared handles.

use pixguard_types::ResourceId;

/// Any widget that can carry a background
pub trait View {
    /// Default background assignment
    fn set_background_resource(&self, id: ResourceId);

    /// Downcast to an image widget
    fn as_image_view(&self) -> Option<&dyn ImageView> {
        None
    }
}

/// Widget that displays an image
pub trait ImageView: View {
    /// Default image assignment
    fn set_image_resource(&self, id: ResourceId);
}

/// Declarative attributes of a widget being created
pub trait AttributeSet {
    /// Resource id stored under `namespace:name`, or `default`
    fn attribute_resource_value(&self, namespace: &str, name: &str, default: i32) -> i32;
}

/// Creates widgets from declarative descriptions
pub trait ViewFactory {
    /// Create the widget named `name`, or `None` to defer to the next factory
    fn create_view(
        &self,
        parent: Option<&dyn View>,
        name: &str,
        attrs: &dyn AttributeSet,
    ) -> Option<Box<dyn View>>;
}

/// Pluggable loader for oversized images
pub trait ImageLoader: Send + Sync {
    /// Load `id` into an image widget
    fn load_image(&self, view: &dyn ImageView, id: ResourceId);

    /// Load `id` as the background of a widget
    fn load_background(&self, view: &dyn View, id: ResourceId);
}

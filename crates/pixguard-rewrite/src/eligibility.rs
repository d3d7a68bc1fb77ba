//! Which classes may be rewritten

/// Namespace filter for rewriting
///
/// A class is eligible when its dotted name lies inside the application
/// namespace and outside the runtime namespace. A blank application
/// namespace makes nothing eligible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eligibility {
    app_namespace: String,
    runtime_namespace: String,
}

impl Eligibility {
    /// Create a filter from dotted namespaces
    #[must_use]
    pub fn new(app_namespace: &str, runtime_namespace: &str) -> Self {
        Self {
            app_namespace: normalize(app_namespace),
            runtime_namespace: normalize(runtime_namespace),
        }
    }

    /// Application namespace
    #[inline]
    #[must_use]
    pub fn app_namespace(&self) -> &str {
        &self.app_namespace
    }

    /// Runtime namespace
    #[inline]
    #[must_use]
    pub fn runtime_namespace(&self) -> &str {
        &self.runtime_namespace
    }

    /// Check a class name in dotted or internal form
    #[must_use]
    pub fn is_eligible(&self, class_name: &str) -> bool {
        let dotted = class_name.replace('/', ".");
        within(&dotted, &self.app_namespace) && !within(&dotted, &self.runtime_namespace)
    }
}

fn normalize(namespace: &str) -> String {
    namespace.trim().replace('/', ".")
}

fn within(name: &str, namespace: &str) -> bool {
    if namespace.is_empty() {
        return false;
    }
    name == namespace
        || name
            .strip_prefix(namespace)
            .is_some_and(|rest| rest.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_namespace_boundaries() {
        let e = Eligibility::new("com.example.app", "io.pixguard.runtime");
        assert!(e.is_eligible("com/example/app/MainActivity"));
        assert!(e.is_eligible("com.example.app.ui.Screen$1"));
        assert!(!e.is_eligible("com/example/application/Other"));
        assert!(!e.is_eligible("com/example/Other"));
    }

    #[test]
    fn runtime_namespace_is_never_eligible() {
        let e = Eligibility::new("io.pixguard", "io.pixguard.runtime");
        assert!(e.is_eligible("io/pixguard/sample/Main"));
        assert!(!e.is_eligible("io/pixguard/runtime/PixGuard"));
        assert!(!e.is_eligible("io/pixguard/runtime/inner/Helper"));
    }

    #[test]
    fn blank_namespace_disables() {
        let e = Eligibility::new("  ", "io.pixguard.runtime");
        assert!(!e.is_eligible("com/example/Main"));
    }
}

//! Call-shape rules
//!
//! A [`CallRule`] pairs the name and descriptor of a virtual call with the
//! static method that replaces it. The replacement takes the receiver as
//! its first parameter, so operand stack effects are identical.

use std::fmt::{self, Display, Formatter};

/// Name of the image-assignment call
pub const SET_IMAGE_RESOURCE: &str = "setImageResource";
/// Name of the background-assignment call
pub const SET_BACKGROUND_RESOURCE: &str = "setBackgroundResource";
/// Descriptor shared by both assignment calls
pub const INT_SETTER_DESCRIPTOR: &str = "(I)V";

/// Name and descriptor a virtual call must match exactly
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodPattern {
    name: String,
    descriptor: String,
}

impl MethodPattern {
    /// Create a pattern
    #[must_use]
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }

    /// Method name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Method descriptor
    #[inline]
    #[must_use]
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// Exact match on both parts
    #[inline]
    #[must_use]
    pub fn matches(&self, name: &str, descriptor: &str) -> bool {
        self.name == name && self.descriptor == descriptor
    }
}

/// Static method a matched call is redirected to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodTarget {
    owner: String,
    name: String,
    descriptor: String,
}

impl MethodTarget {
    /// Create a target; `owner` may be dotted or internal form
    #[must_use]
    pub fn new(owner: &str, name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            owner: owner.replace('.', "/"),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }

    /// Owner internal name (`a/b/C`)
    #[inline]
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Method name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Method descriptor
    #[inline]
    #[must_use]
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }
}

impl Display for MethodTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.owner, self.name, self.descriptor)
    }
}

/// One rewrite rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRule {
    /// Virtual call to match
    pub pattern: MethodPattern,
    /// Static replacement
    pub replacement: MethodTarget,
}

impl CallRule {
    /// Create a rule
    #[must_use]
    pub fn new(pattern: MethodPattern, replacement: MethodTarget) -> Self {
        Self {
            pattern,
            replacement,
        }
    }
}

/// Ordered rules; the first match wins
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<CallRule>,
}

impl RuleSet {
    /// Empty rule set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The two assignment rules, redirected to `dispatcher` (dotted or
    /// internal class name)
    #[must_use]
    pub fn defaults(dispatcher: &str) -> Self {
        Self::new()
            .with_rule(CallRule::new(
                MethodPattern::new(SET_IMAGE_RESOURCE, INT_SETTER_DESCRIPTOR),
                MethodTarget::new(
                    dispatcher,
                    "loadImageResource",
                    "(Landroid/widget/ImageView;I)V",
                ),
            ))
            .with_rule(CallRule::new(
                MethodPattern::new(SET_BACKGROUND_RESOURCE, INT_SETTER_DESCRIPTOR),
                MethodTarget::new(
                    dispatcher,
                    "loadBackgroundResource",
                    "(Landroid/view/View;I)V",
                ),
            ))
    }

    /// Append a rule
    #[must_use]
    pub fn with_rule(mut self, rule: CallRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// First rule matching a call
    #[must_use]
    pub fn find(&self, name: &str, descriptor: &str) -> Option<&CallRule> {
        self.rules.iter().find(|r| r.pattern.matches(name, descriptor))
    }

    /// Rules in order
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &[CallRule] {
        &self.rules
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules() {
        let rules = RuleSet::defaults("io.pixguard.runtime.PixGuard");
        assert_eq!(rules.rules().len(), 2);

        let image = rules.find("setImageResource", "(I)V").unwrap();
        assert_eq!(
            image.replacement.to_string(),
            "io/pixguard/runtime/PixGuard.loadImageResource(Landroid/widget/ImageView;I)V"
        );
        let background = rules.find("setBackgroundResource", "(I)V").unwrap();
        assert_eq!(background.replacement.name(), "loadBackgroundResource");

        assert!(rules.find("setImageResource", "(J)V").is_none());
        assert!(rules.find("setImageDrawable", "(I)V").is_none());
    }

    #[test]
    fn first_match_wins() {
        let rules = RuleSet::new()
            .with_rule(CallRule::new(
                MethodPattern::new("m", "()V"),
                MethodTarget::new("a/First", "m", "(Ljava/lang/Object;)V"),
            ))
            .with_rule(CallRule::new(
                MethodPattern::new("m", "()V"),
                MethodTarget::new("a/Second", "m", "(Ljava/lang/Object;)V"),
            ));
        assert_eq!(rules.find("m", "()V").unwrap().replacement.owner(), "a/First");
    }
}

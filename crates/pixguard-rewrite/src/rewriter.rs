//! Single-class call-site rewriting
//!
//! Matching `invokevirtual` instructions are overwritten in place with an
//! `invokestatic` of the same length. The constant pool only grows at its
//! tail and no other byte of the class changes, so branch offsets,
//! exception tables and stack map frames remain valid.

use pixguard_classfile::{assemble, opcode, BytePatch, ClassFile, Instructions, MemberRefKind, PoolExtension};
use tracing::debug;

use crate::eligibility::Eligibility;
use crate::error::RewriteResult;
use crate::rule::RuleSet;

/// Result of rewriting one class
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// Outside the instrumented namespace; left untouched
    Ineligible,
    /// Eligible, but no call site matched
    Unchanged,
    /// At least one call site replaced
    Rewritten {
        /// New class bytes
        bytes: Vec<u8>,
        /// Number of replaced call sites
        call_sites: usize,
    },
}

impl RewriteOutcome {
    /// Replaced call sites
    #[inline]
    #[must_use]
    pub fn call_sites(&self) -> usize {
        match self {
            Self::Rewritten { call_sites, .. } => *call_sites,
            _ => 0,
        }
    }

    /// Final bytes: the rewritten class, or `original` when nothing changed
    #[must_use]
    pub fn into_bytes(self, original: Vec<u8>) -> Vec<u8> {
        match self {
            Self::Rewritten { bytes, .. } => bytes,
            _ => original,
        }
    }
}

/// Rewrites call sites of eligible classes according to a [`RuleSet`]
#[derive(Debug, Clone)]
pub struct ClassRewriter {
    rules: RuleSet,
    eligibility: Eligibility,
}

impl ClassRewriter {
    /// Create a rewriter
    #[must_use]
    pub fn new(rules: RuleSet, eligibility: Eligibility) -> Self {
        Self { rules, eligibility }
    }

    /// Default assignment rules onto `<runtime_namespace>.<dispatcher_class>`
    #[must_use]
    pub fn with_defaults(app_namespace: &str, runtime_namespace: &str, dispatcher_class: &str) -> Self {
        let dispatcher = format!("{}.{}", runtime_namespace.trim(), dispatcher_class.trim());
        Self::new(
            RuleSet::defaults(&dispatcher),
            Eligibility::new(app_namespace, runtime_namespace),
        )
    }

    /// Active rules
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Active namespace filter
    #[inline]
    #[must_use]
    pub fn eligibility(&self) -> &Eligibility {
        &self.eligibility
    }

    /// Rewrite one class file
    ///
    /// # Errors
    ///
    /// Fails when the class cannot be decoded, a referenced constant is
    /// broken, or the constant pool would overflow.
    pub fn rewrite(&self, bytes: &[u8]) -> RewriteResult<RewriteOutcome> {
        let class = ClassFile::parse(bytes)?;
        let class_name = class.this_class_name()?;
        if !self.eligibility.is_eligible(class_name) {
            return Ok(RewriteOutcome::Ineligible);
        }

        let pool = class.constant_pool();
        let mut extension = PoolExtension::new(pool);
        let mut patches = Vec::new();

        for method in class.methods() {
            let Some(code) = class.code(method)? else {
                continue;
            };
            let method_name = class.member_name(method)?;
            for insn in Instructions::new(class.code_bytes(&code)) {
                let insn = insn?;
                if insn.opcode != opcode::INVOKEVIRTUAL {
                    continue;
                }
                let Some(index) = insn.u16_operand() else {
                    continue;
                };
                let target = pool.member_ref(index)?;
                if target.kind != MemberRefKind::Method {
                    continue;
                }
                let Some(rule) = self.rules.find(target.name, target.descriptor) else {
                    continue;
                };

                let replacement = &rule.replacement;
                let new_index = extension.method_ref(
                    replacement.owner(),
                    replacement.name(),
                    replacement.descriptor(),
                )?;
                let [hi, lo] = new_index.to_be_bytes();
                patches.push(BytePatch::new(
                    code.code_offset + insn.offset,
                    [opcode::INVOKESTATIC, hi, lo],
                ));
                debug!(
                    class = class_name,
                    method = method_name,
                    offset = insn.offset,
                    owner = target.owner,
                    call = target.name,
                    to = %replacement,
                    "Rewrote call site"
                );
            }
        }

        if patches.is_empty() {
            return Ok(RewriteOutcome::Unchanged);
        }
        let call_sites = patches.len();
        let bytes = assemble(&class, &extension, &patches)?;
        Ok(RewriteOutcome::Rewritten { bytes, call_sites })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixguard_classfile::{ClassFileError, Instruction};
    use pixguard_test_utils::ClassBuilder;
    use pretty_assertions::assert_eq;

    const IMAGE_VIEW: &str = "android/widget/ImageView";
    const VIEW: &str = "android/view/View";

    fn rewriter() -> ClassRewriter {
        ClassRewriter::with_defaults("com.example.app", "io.pixguard.runtime", "PixGuard")
    }

    fn calls(bytes: &[u8]) -> Vec<(u8, String)> {
        let class = ClassFile::parse(bytes).unwrap();
        let mut out = Vec::new();
        for method in class.methods() {
            let Some(code) = class.code(method).unwrap() else {
                continue;
            };
            for insn in Instructions::new(class.code_bytes(&code)) {
                let insn: Instruction<'_> = insn.unwrap();
                if (0xb6..=0xb9).contains(&insn.opcode) {
                    let r = class
                        .constant_pool()
                        .member_ref(insn.u16_operand().unwrap())
                        .unwrap();
                    out.push((insn.opcode, format!("{}.{}{}", r.owner, r.name, r.descriptor)));
                }
            }
        }
        out
    }

    fn screen() -> Vec<u8> {
        ClassBuilder::new("com/example/app/Screen")
            .method("bind", "(Landroid/widget/ImageView;)V", |c| {
                c.aload(1)
                    .push_int(0x7f08_0001)
                    .invokevirtual(IMAGE_VIEW, "setImageResource", "(I)V")
                    .aload(1)
                    .push_int(0x7f08_0002)
                    .invokevirtual(VIEW, "setBackgroundResource", "(I)V")
                    .aload(1)
                    .push_int(3)
                    .invokevirtual(IMAGE_VIEW, "setImageLevel", "(I)V")
                    .aload(1)
                    .op(0x09)
                    .invokevirtual(IMAGE_VIEW, "setImageResource", "(J)V")
                    .ret();
            })
            .method("other", "()V", |c| {
                c.aload(0)
                    .push_int(1)
                    .invokeinterface("com/example/app/Sink", "setImageResource", "(I)V", 2)
                    .aload(0)
                    .push_int(1)
                    .invokespecial("com/example/app/Base", "setBackgroundResource", "(I)V")
                    .ret();
            })
            .build()
    }

    #[test]
    fn replaces_exact_matches_only() {
        let original = screen();
        let outcome = rewriter().rewrite(&original).unwrap();
        assert_eq!(outcome.call_sites(), 2);
        let rewritten = outcome.into_bytes(original.clone());

        assert_eq!(
            calls(&rewritten),
            vec![
                (
                    0xb8,
                    "io/pixguard/runtime/PixGuard.loadImageResource(Landroid/widget/ImageView;I)V".to_owned()
                ),
                (
                    0xb8,
                    "io/pixguard/runtime/PixGuard.loadBackgroundResource(Landroid/view/View;I)V".to_owned()
                ),
                (0xb6, format!("{IMAGE_VIEW}.setImageLevel(I)V")),
                (0xb6, format!("{IMAGE_VIEW}.setImageResource(J)V")),
                (0xb9, "com/example/app/Sink.setImageResource(I)V".to_owned()),
                (0xb7, "com/example/app/Base.setBackgroundResource(I)V".to_owned()),
            ]
        );
    }

    #[test]
    fn only_pool_tail_and_opcodes_change() {
        let original = screen();
        let class = ClassFile::parse(&original).unwrap();
        let pool_end = class.constant_pool_end();
        let rewritten = rewriter().rewrite(&original).unwrap().into_bytes(original.clone());
        let added = rewritten.len() - original.len();

        // Header and existing pool entries are untouched except the count
        assert_eq!(&rewritten[..8], &original[..8]);
        assert_eq!(&rewritten[10..pool_end], &original[10..pool_end]);

        // After the pool, only the two 3-byte call sites differ
        let diffs = original[pool_end..]
            .iter()
            .zip(&rewritten[pool_end + added..])
            .filter(|(a, b)| a != b)
            .count();
        assert!(diffs > 0 && diffs <= 6, "unexpected diff count {diffs}");
    }

    #[test]
    fn ineligible_and_unchanged() {
        let runtime = ClassBuilder::new("io/pixguard/runtime/PixGuard")
            .method("f", "(Landroid/widget/ImageView;)V", |c| {
                c.aload(1)
                    .push_int(1)
                    .invokevirtual(IMAGE_VIEW, "setImageResource", "(I)V")
                    .ret();
            })
            .build();
        assert_eq!(rewriter().rewrite(&runtime).unwrap(), RewriteOutcome::Ineligible);

        let library = ClassBuilder::new("com/library/Widget").build();
        assert_eq!(rewriter().rewrite(&library).unwrap(), RewriteOutcome::Ineligible);

        let plain = ClassBuilder::new("com/example/app/Plain")
            .abstract_method("g", "()V")
            .method("f", "()V", |c| {
                c.ret();
            })
            .build();
        assert_eq!(rewriter().rewrite(&plain).unwrap(), RewriteOutcome::Unchanged);
    }

    #[test]
    fn switch_padding_is_respected() {
        let original = ClassBuilder::new("com/example/app/Switchy")
            .method("f", "(Landroid/widget/ImageView;I)V", |c| {
                c.op(0x1b) // iload_1
                    .tableswitch(0, 2)
                    .aload(1)
                    .push_int(0x7f08_0001)
                    .invokevirtual(IMAGE_VIEW, "setImageResource", "(I)V")
                    .ret();
            })
            .build();
        let outcome = rewriter().rewrite(&original).unwrap();
        assert_eq!(outcome.call_sites(), 1);
        let rewritten = outcome.into_bytes(original);
        assert_eq!(calls(&rewritten)[0].0, opcode::INVOKESTATIC);
    }

    #[test]
    fn rewriting_twice_is_stable() {
        let original = screen();
        let once = rewriter().rewrite(&original).unwrap().into_bytes(original);
        // Rewritten sites are invokestatic now, so nothing matches again
        assert_eq!(rewriter().rewrite(&once).unwrap(), RewriteOutcome::Unchanged);
    }

    #[test]
    fn undecodable_input_is_an_error() {
        let err = rewriter().rewrite(b"not a class").unwrap_err();
        assert!(matches!(
            err,
            crate::RewriteError::ClassFile(ClassFileError::BadMagic(_))
        ));
    }
}

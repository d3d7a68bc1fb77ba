//! Rewriting whole class directories and jars
//!
//! Modules are rewritten independently on the rayon pool. Output order and
//! content depend only on the input, so unchanged inputs reproduce
//! identical outputs.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{info, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::error::{RewriteError, RewriteResult};
use crate::rewriter::ClassRewriter;

/// Counts from one batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Class modules examined
    pub modules_seen: usize,
    /// Modules written with at least one replaced call site
    pub modules_rewritten: usize,
    /// Replaced call sites across all modules
    pub call_sites: usize,
    /// Modules that failed to decode and were copied verbatim
    pub modules_failed: usize,
}

impl BatchReport {
    fn record(&mut self, module: &ModuleResult) {
        if module.is_class {
            self.modules_seen += 1;
        }
        if module.call_sites > 0 {
            self.modules_rewritten += 1;
            self.call_sites += module.call_sites;
        }
        if module.failed {
            self.modules_failed += 1;
        }
    }
}

struct ModuleResult {
    bytes: Vec<u8>,
    is_class: bool,
    call_sites: usize,
    failed: bool,
}

fn is_class_name(name: &str) -> bool {
    name.ends_with(".class")
}

impl ClassRewriter {
    fn process_module(&self, name: &str, bytes: Vec<u8>) -> ModuleResult {
        if !is_class_name(name) {
            return ModuleResult {
                bytes,
                is_class: false,
                call_sites: 0,
                failed: false,
            };
        }
        match self.rewrite(&bytes) {
            Ok(outcome) => {
                let call_sites = outcome.call_sites();
                ModuleResult {
                    bytes: outcome.into_bytes(bytes),
                    is_class: true,
                    call_sites,
                    failed: false,
                }
            }
            Err(e) => {
                warn!(module = name, error = %e, "Copying undecodable module verbatim");
                ModuleResult {
                    bytes,
                    is_class: true,
                    call_sites: 0,
                    failed: true,
                }
            }
        }
    }

    /// Rewrite every file under `input` into the same relative path under
    /// `output`; non-class files are copied
    ///
    /// `output` may equal `input` for in-place rewriting.
    ///
    /// # Errors
    ///
    /// Fails on traversal or IO errors. Undecodable classes are not errors.
    pub fn rewrite_directory(&self, input: &Path, output: &Path) -> RewriteResult<BatchReport> {
        let files = WalkDir::new(input)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) if entry.file_type().is_file() => Some(Ok(entry.into_path())),
                Ok(_) => None,
                Err(e) => Some(Err(RewriteError::from(e))),
            })
            .collect::<RewriteResult<Vec<PathBuf>>>()?;

        let results = files
            .par_iter()
            .map(|path| -> RewriteResult<ModuleResult> {
                let rel = path.strip_prefix(input).unwrap_or(path);
                let bytes = std::fs::read(path).map_err(|e| RewriteError::io_error(path, e))?;
                let module = self.process_module(&rel.to_string_lossy(), bytes);

                let dest = output.join(rel);
                if let Some(parent) = dest.parent() {
                    std::fs::create_dir_all(parent).map_err(|e| RewriteError::io_error(parent, e))?;
                }
                std::fs::write(&dest, &module.bytes).map_err(|e| RewriteError::io_error(&dest, e))?;
                Ok(module)
            })
            .collect::<RewriteResult<Vec<_>>>()?;

        let mut report = BatchReport::default();
        for module in &results {
            report.record(module);
        }
        info!(
            input = %input.display(),
            seen = report.modules_seen,
            rewritten = report.modules_rewritten,
            call_sites = report.call_sites,
            "Rewrote class directory"
        );
        Ok(report)
    }

    /// Rewrite a jar into a new jar with the same entry order
    ///
    /// Entries are written with a fixed timestamp.
    ///
    /// # Errors
    ///
    /// Fails when either jar cannot be read or written. Undecodable classes
    /// are not errors.
    pub fn rewrite_jar(&self, input: &Path, output: &Path) -> RewriteResult<BatchReport> {
        let file = std::fs::File::open(input).map_err(|e| RewriteError::io_error(input, e))?;
        let mut archive = ZipArchive::new(file).map_err(|e| RewriteError::archive_error(input, e))?;

        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut entry = archive
                .by_index(index)
                .map_err(|e| RewriteError::archive_error(input, e))?;
            let name = entry.name().to_owned();
            let is_dir = entry.is_dir();
            let mut bytes = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
            entry
                .read_to_end(&mut bytes)
                .map_err(|e| RewriteError::io_error(input, e))?;
            entries.push((name, is_dir, bytes));
        }

        let results: Vec<(String, bool, ModuleResult)> = entries
            .into_par_iter()
            .map(|(name, is_dir, bytes)| {
                let module = self.process_module(&name, bytes);
                (name, is_dir, module)
            })
            .collect();

        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent).map_err(|e| RewriteError::io_error(parent, e))?;
        }
        let out = std::fs::File::create(output).map_err(|e| RewriteError::io_error(output, e))?;
        let mut zip = ZipWriter::new(out);
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        let mut report = BatchReport::default();
        for (name, is_dir, module) in results {
            report.record(&module);
            if is_dir {
                zip.add_directory(name, options)
                    .map_err(|e| RewriteError::archive_error(output, e))?;
                continue;
            }
            zip.start_file(name, options)
                .map_err(|e| RewriteError::archive_error(output, e))?;
            zip.write_all(&module.bytes)
                .map_err(|e| RewriteError::io_error(output, e))?;
        }
        zip.finish()
            .map_err(|e| RewriteError::archive_error(output, e))?;

        info!(
            input = %input.display(),
            seen = report.modules_seen,
            rewritten = report.modules_rewritten,
            call_sites = report.call_sites,
            "Rewrote jar"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixguard_test_utils::{read_jar, write_jar, ClassBuilder};
    use pretty_assertions::assert_eq;

    fn rewriter() -> ClassRewriter {
        ClassRewriter::with_defaults("com.example.app", "io.pixguard.runtime", "PixGuard")
    }

    fn caller(name: &str) -> Vec<u8> {
        ClassBuilder::new(name)
            .method("bind", "(Landroid/widget/ImageView;)V", |c| {
                c.aload(1)
                    .push_int(0x7f08_0001)
                    .invokevirtual("android/widget/ImageView", "setImageResource", "(I)V")
                    .ret();
            })
            .build()
    }

    #[test]
    fn directory_rewrite_copies_everything() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let app = caller("com/example/app/Main");
        let lib = caller("com/lib/Widget");
        std::fs::create_dir_all(input.path().join("com/example/app")).unwrap();
        std::fs::create_dir_all(input.path().join("com/lib")).unwrap();
        std::fs::write(input.path().join("com/example/app/Main.class"), &app).unwrap();
        std::fs::write(input.path().join("com/lib/Widget.class"), &lib).unwrap();
        std::fs::write(input.path().join("com/example/app/Broken.class"), b"junk").unwrap();
        std::fs::write(input.path().join("notes.txt"), b"hello").unwrap();

        let report = rewriter().rewrite_directory(input.path(), output.path()).unwrap();
        assert_eq!(
            report,
            BatchReport {
                modules_seen: 3,
                modules_rewritten: 1,
                call_sites: 1,
                modules_failed: 1,
            }
        );

        let out = |rel: &str| std::fs::read(output.path().join(rel)).unwrap();
        assert_ne!(out("com/example/app/Main.class"), app);
        assert_eq!(out("com/lib/Widget.class"), lib);
        assert_eq!(out("com/example/app/Broken.class"), b"junk");
        assert_eq!(out("notes.txt"), b"hello");
    }

    #[test]
    fn jar_rewrite_is_deterministic_and_ordered() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.jar");
        let app = caller("com/example/app/Main");
        write_jar(
            &input,
            &[
                ("META-INF/MANIFEST.MF", &b"Manifest-Version: 1.0\n"[..]),
                ("com/example/app/Main.class", app.as_slice()),
                ("assets/readme.txt", &b"text"[..]),
            ],
        );

        let first = dir.path().join("out1.jar");
        let second = dir.path().join("out2.jar");
        let report = rewriter().rewrite_jar(&input, &first).unwrap();
        rewriter().rewrite_jar(&input, &second).unwrap();

        assert_eq!(report.modules_seen, 1);
        assert_eq!(report.call_sites, 1);
        assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());

        let entries = read_jar(&first);
        let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec!["META-INF/MANIFEST.MF", "com/example/app/Main.class", "assets/readme.txt"]
        );
        assert_ne!(entries[1].1, app);
        assert_eq!(entries[2].1, b"text");
    }

    #[test]
    fn missing_jar_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = rewriter()
            .rewrite_jar(&dir.path().join("missing.jar"), &dir.path().join("out.jar"))
            .unwrap_err();
        assert!(matches!(err, RewriteError::Io { .. }));
    }
}

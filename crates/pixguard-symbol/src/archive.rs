//! Reading identifier modules out of a compiled `R.jar`

use std::io::{Read, Seek};
use std::path::Path;

use pixguard_classfile::ClassFile;
use pixguard_types::ResourceId;
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::error::{SymbolError, SymbolResult};
use crate::table::SymbolTable;

/// Entry-name prefix of identifier modules for a dotted namespace
///
/// `com.example.app` → `com/example/app/R$`
#[must_use]
pub fn module_prefix(namespace: &str) -> String {
    format!("{}/R$", namespace.trim().replace('.', "/"))
}

/// Resource type named by an archive entry, if it is an identifier module
/// of the namespace behind `prefix`
#[must_use]
pub fn module_type<'e>(entry: &'e str, prefix: &str) -> Option<&'e str> {
    let resource_type = entry.strip_prefix(prefix)?.strip_suffix(".class")?;
    let plain = !resource_type.is_empty() && !resource_type.contains(['/', '$']);
    plain.then_some(resource_type)
}

/// Parse an identifier archive on disk
///
/// # Errors
///
/// Fails when the file cannot be opened or is not a zip container.
/// Individual modules that fail to decode are logged and skipped.
pub fn parse_archive(path: &Path, namespace: &str) -> SymbolResult<SymbolTable> {
    let file = std::fs::File::open(path).map_err(|e| SymbolError::io_error(path, e))?;
    let archive = ZipArchive::new(file).map_err(|e| SymbolError::archive_error(path, e))?;
    parse_zip(archive, path, namespace)
}

/// Parse identifier modules from an already-open zip container
///
/// # Errors
///
/// Fails when the central directory cannot be read.
pub fn parse_zip<R: Read + Seek>(
    mut archive: ZipArchive<R>,
    path: &Path,
    namespace: &str,
) -> SymbolResult<SymbolTable> {
    let prefix = module_prefix(namespace);
    let mut table = SymbolTable::new();

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| SymbolError::archive_error(path, e))?;
        let name = entry.name().to_owned();
        let Some(resource_type) = module_type(&name, &prefix) else {
            continue;
        };

        let mut bytes = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        if let Err(e) = entry.read_to_end(&mut bytes) {
            warn!(entry = %name, error = %e, "Skipping unreadable identifier module");
            continue;
        }

        match read_module(&bytes) {
            Ok(fields) => {
                debug!(entry = %name, count = fields.len(), "Parsed identifier module");
                for (field, value) in fields {
                    table.insert(resource_type, field, ResourceId::new(value));
                }
            }
            Err(source) => {
                let err = SymbolError::Module {
                    entry: name,
                    source,
                };
                warn!(error = %err, "Skipping identifier module");
            }
        }
    }

    Ok(table)
}

fn read_module(bytes: &[u8]) -> Result<Vec<(String, i32)>, pixguard_classfile::ClassFileError> {
    let class = ClassFile::parse(bytes)?;
    Ok(class
        .static_int_constants()?
        .into_iter()
        .map(|(name, value)| (name.to_owned(), value))
        .collect())
}

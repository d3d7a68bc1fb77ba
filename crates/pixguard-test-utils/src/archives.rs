//! Jar (zip) fixtures

use std::io::{Cursor, Read, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Zip the given `(entry name, contents)` pairs in order
pub fn jar_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, data) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Write a jar to `path`, creating parent directories
pub fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, jar_bytes(entries)).unwrap();
}

/// All entries of a jar on disk, in archive order
pub fn read_jar(path: &Path) -> Vec<(String, Vec<u8>)> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = ZipArchive::new(file).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut entry = archive.by_index(i).unwrap();
            let mut data = Vec::new();
            entry.read_to_end(&mut data).unwrap();
            (entry.name().to_owned(), data)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn written_jar_reads_back_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/R.jar");
        write_jar(&path, &[("b.txt", &b"2"[..]), ("a.txt", &b"1"[..])]);
        let entries = read_jar(&path);
        assert_eq!(entries[0], ("b.txt".to_owned(), b"2".to_vec()));
        assert_eq!(entries[1].0, "a.txt");
    }
}

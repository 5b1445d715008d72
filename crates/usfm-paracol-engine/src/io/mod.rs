use std::fs;
use std::path::{Path, PathBuf};

use crate::verse_map::VerseMap;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not find book {book_id} under {}", root.display())]
    MissingBook { book_id: String, root: PathBuf },
    #[error("No edition folder matching {label:?} under {}", root.display())]
    MissingEdition { label: String, root: PathBuf },
    #[error("Could not unpack {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("Bad verse map {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads a source document. Invalid UTF-8 is replaced and a leading BOM dropped.
pub fn read_source(path: &Path) -> Result<String, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.strip_prefix('\u{FEFF}').unwrap_or(&text).to_string())
}

/// Write content to a file, creating parent directories as needed
pub fn write_file(path: &Path, content: &str) -> Result<(), IoError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

/// Scan for USFM files (`.usfm`, `.sfm`) below `root`, sorted by path
pub fn scan_usfm_files(root: &Path) -> Result<Vec<PathBuf>, IoError> {
    if !root.is_dir() {
        return Err(IoError::NotFound(root.to_path_buf()));
    }

    let mut files = Vec::new();
    scan_directory_recursive(root, &mut files)?;
    files.sort();
    Ok(files)
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if is_usfm(&path) {
            files.push(path);
        }
    }

    Ok(())
}

fn is_usfm(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("usfm") || ext.eq_ignore_ascii_case("sfm"))
}

/// Finds the file holding `book_id` in a source tree.
///
/// The `\id` line wins; a file name containing the code is the fallback for
/// sources that omit it.
pub fn find_book_file(root: &Path, book_id: &str) -> Result<PathBuf, IoError> {
    let files = scan_usfm_files(root)?;

    for file in &files {
        let content = read_source(file)?;
        let mut words = content.split_whitespace();
        let id_matches = words.next() == Some(r"\id")
            && words.next().is_some_and(|code| code.eq_ignore_ascii_case(book_id));
        if id_matches {
            return Ok(file.clone());
        }
    }

    let needle = book_id.to_uppercase();
    files
        .into_iter()
        .find(|f| {
            f.file_name()
                .is_some_and(|n| n.to_string_lossy().to_uppercase().contains(&needle))
        })
        .ok_or_else(|| IoError::MissingBook {
            book_id: book_id.to_string(),
            root: root.to_path_buf(),
        })
}

/// First sub-directory of `root` whose name contains `label`, ignoring case.
pub fn find_edition_dir(root: &Path, label: &str) -> Result<PathBuf, IoError> {
    if !root.is_dir() {
        return Err(IoError::NotFound(root.to_path_buf()));
    }

    let mut dirs: Vec<PathBuf> = fs::read_dir(root)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();

    let needle = label.to_lowercase();
    dirs.into_iter()
        .find(|d| {
            d.file_name()
                .is_some_and(|n| n.to_string_lossy().to_lowercase().contains(&needle))
        })
        .ok_or_else(|| IoError::MissingEdition {
            label: label.to_string(),
            root: root.to_path_buf(),
        })
}

/// Unpacks every source archive under `sources` into `out/<stem>/`.
///
/// Loose USFM files are copied the same way, so every edition ends up as one
/// folder. Returns the folders written, in source order.
pub fn unpack_sources(sources: &Path, out: &Path) -> Result<Vec<PathBuf>, IoError> {
    if !sources.is_dir() {
        return Err(IoError::NotFound(sources.to_path_buf()));
    }

    let mut entries: Vec<PathBuf> = fs::read_dir(sources)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    entries.sort();

    let mut written = vec![];
    for path in entries {
        let Some(stem) = path.file_stem() else {
            continue;
        };
        let target = out.join(stem);

        let is_zip = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
        if is_zip {
            fs::create_dir_all(&target)?;
            let archive_err = |source| IoError::Archive {
                path: path.clone(),
                source,
            };
            let file = fs::File::open(&path)?;
            let mut archive = zip::ZipArchive::new(file).map_err(archive_err)?;
            archive.extract(&target).map_err(archive_err)?;
            log::info!("unpacked {} -> {}", path.display(), target.display());
        } else if is_usfm(&path) {
            fs::create_dir_all(&target)?;
            if let Some(name) = path.file_name() {
                fs::copy(&path, target.join(name))?;
            }
            log::info!("copied {} -> {}", path.display(), target.display());
        } else {
            log::debug!("skipping {}", path.display());
            continue;
        }
        written.push(target);
    }

    Ok(written)
}

pub fn read_verse_map(path: &Path) -> Result<VerseMap, IoError> {
    let content = read_source(path)?;
    serde_json::from_str(&content).map_err(|source| IoError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a verse map as pretty JSON, keeping reference order.
pub fn write_verse_map(path: &Path, verses: &VerseMap) -> Result<(), IoError> {
    let json = serde_json::to_string_pretty(verses).map_err(|source| IoError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_file(path, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{create_test_dir, create_test_file};
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_read_source_strips_bom_and_replaces_bad_bytes() {
        let dir = create_test_dir();
        let path = dir.path().join("bom.usfm");
        fs::write(&path, b"\xEF\xBB\xBF\\id JER\n\\v 1 a\xFFb").unwrap();

        let content = read_source(&path).unwrap();
        assert_eq!(content, "\\id JER\n\\v 1 a\u{FFFD}b");
    }

    #[test]
    fn test_read_source_not_found() {
        let dir = create_test_dir();
        let result = read_source(&dir.path().join("missing.usfm"));
        assert!(matches!(result, Err(IoError::NotFound(_))));
    }

    #[test]
    fn test_scan_finds_nested_usfm_only() {
        let dir = create_test_dir();
        create_test_file(&dir, "b.usfm", "");
        create_test_file(&dir, "nested/a.SFM", "");
        create_test_file(&dir, "notes.txt", "");

        let files = scan_usfm_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            [PathBuf::from("b.usfm"), PathBuf::from("nested/a.SFM")]
        );
    }

    #[test]
    fn test_find_book_prefers_id_line() {
        let dir = create_test_dir();
        create_test_file(&dir, "25-JER.usfm", "\\id ISA\n");
        let wanted = create_test_file(&dir, "x.usfm", "\\id jer Prideaux\n");

        assert_eq!(find_book_file(dir.path(), "JER").unwrap(), wanted);
    }

    #[test]
    fn test_find_book_falls_back_to_file_name() {
        let dir = create_test_dir();
        let wanted = create_test_file(&dir, "25-JEReng.usfm", "\\c 1\n");

        assert_eq!(find_book_file(dir.path(), "jer").unwrap(), wanted);
    }

    #[test]
    fn test_missing_book_is_an_error() {
        let dir = create_test_dir();
        create_test_file(&dir, "isa.usfm", "\\id ISA\n");

        let err = find_book_file(dir.path(), "JER").unwrap_err();
        assert!(matches!(err, IoError::MissingBook { ref book_id, .. } if book_id == "JER"));
        assert!(err.to_string().contains("JER"));
    }

    #[test]
    fn test_find_edition_dir_ignores_case() {
        let dir = create_test_dir();
        create_test_file(&dir, "eng-web_usfm/a.usfm", "");
        create_test_file(&dir, "eng-Brenton_usfm/a.usfm", "");

        let found = find_edition_dir(dir.path(), "brenton").unwrap();
        assert_eq!(found, dir.path().join("eng-Brenton_usfm"));
        assert!(matches!(
            find_edition_dir(dir.path(), "kjv"),
            Err(IoError::MissingEdition { .. })
        ));
    }

    #[test]
    fn test_unpack_archives_and_loose_files() {
        let sources = create_test_dir();
        let out = create_test_dir();

        let archive_path = sources.path().join("eng-web_usfm.zip");
        let mut zip = zip::ZipWriter::new(fs::File::create(&archive_path).unwrap());
        zip.start_file("25-JEReng.usfm", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"\\id JER\n").unwrap();
        zip.finish().unwrap();

        create_test_file(&sources, "eng-Prideaux.usfm", "\\id JER\n");
        create_test_file(&sources, "README.md", "ignored");

        let written = unpack_sources(sources.path(), out.path()).unwrap();
        assert_eq!(
            written,
            [out.path().join("eng-Prideaux"), out.path().join("eng-web_usfm")]
        );
        assert!(out.path().join("eng-web_usfm/25-JEReng.usfm").is_file());
        assert!(out.path().join("eng-Prideaux/eng-Prideaux.usfm").is_file());
    }

    #[test]
    fn test_verse_map_json_keeps_order() {
        let dir = create_test_dir();
        let path = dir.path().join("json/book.json");
        let verses: VerseMap = [("2:1", "␞P␞b"), ("1:1", "␞P␞a")]
            .into_iter()
            .map(|(r, t)| (r.parse().unwrap(), t.to_string()))
            .collect();

        write_verse_map(&path, &verses).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.find("2:1").unwrap() < text.find("1:1").unwrap());
        assert!(text.contains("␞P␞b"));
        assert_eq!(read_verse_map(&path).unwrap(), verses);
    }

    #[test]
    fn test_bad_json_names_the_file() {
        let dir = create_test_dir();
        let path = create_test_file(&dir, "bad.json", "{\"x\": 1}");
        let err = read_verse_map(&path).unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }
}

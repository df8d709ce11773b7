//! Archive: zip the bundle directory.
//!
//! Entry names are relative to the bundle directory, so the archive root is
//! the directory's contents. Entries are added in sorted order with a fixed
//! 1980-01-01 timestamp, making repeated archives of an unchanged tree
//! byte-identical. The zip is written to a temporary file next to the target
//! and renamed into place only once complete.

use crate::bundler::{
    Settings,
    builder::checksum::calculate_sha256,
    error::{Context, Error, ErrorExt, Result},
    utils::fs::dir_has_entries,
};
use serde::Serialize;
use std::{
    fs::File,
    io::{self, BufWriter},
    path::{Path, PathBuf},
};
use zip::{CompressionMethod, DateTime, ZipWriter, write::SimpleFileOptions};

/// What Archive produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveSummary {
    /// Archive location.
    pub path: PathBuf,
    /// Number of file entries; unknown for an archive that was only read back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<usize>,
    /// Number of directory entries; unknown for an archive that was only read
    /// back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directories: Option<usize>,
    /// Archive size in bytes.
    pub size: u64,
    /// Hex SHA-256 of the archive.
    pub sha256: String,
}

impl ArchiveSummary {
    /// Reads size and checksum of an existing archive.
    ///
    /// Entry counts are not recomputed and are left as `None`.
    pub async fn describe(path: &Path) -> Result<Self> {
        let size = tokio::fs::metadata(path)
            .await
            .fs_context("reading archive metadata", path)?
            .len();
        Ok(Self {
            path: path.to_path_buf(),
            files: None,
            directories: None,
            size,
            sha256: calculate_sha256(path).await?,
        })
    }
}

/// Runs Archive for `settings`: `<bundle>` to `<bundle>.zip`.
pub async fn archive(settings: &Settings) -> Result<ArchiveSummary> {
    create_archive(&settings.bundle_dir(), &settings.archive_path()).await
}

/// Compresses `source_dir` into `archive_path`, replacing any existing file.
///
/// # Errors
///
/// - [`Error::EmptyBundle`] if `source_dir` is missing or empty
/// - filesystem errors if the archive location is not writable; no partial
///   archive is left behind
pub async fn create_archive(source_dir: &Path, archive_path: &Path) -> Result<ArchiveSummary> {
    if !dir_has_entries(source_dir).await? {
        return Err(Error::EmptyBundle(source_dir.to_path_buf()));
    }

    log::info!(
        "Archiving {} -> {}",
        source_dir.display(),
        archive_path.display()
    );

    let source = source_dir.to_path_buf();
    let target = archive_path.to_path_buf();
    let (files, directories) =
        tokio::task::spawn_blocking(move || write_archive(&source, &target))
            .await
            .map_err(|e| Error::GenericError(format!("Archive task panicked: {}", e)))??;

    let size = tokio::fs::metadata(archive_path)
        .await
        .fs_context("reading archive metadata", archive_path)?
        .len();
    let sha256 = calculate_sha256(archive_path).await?;

    log::info!(
        "✓ Created {} ({} files, {} bytes)",
        archive_path.display(),
        files,
        size
    );

    Ok(ArchiveSummary {
        path: archive_path.to_path_buf(),
        files: Some(files),
        directories: Some(directories),
        size,
        sha256,
    })
}

/// Writes the zip synchronously. Returns `(files, directories)` counts.
fn write_archive(source_dir: &Path, archive_path: &Path) -> Result<(usize, usize)> {
    let parent = match archive_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let Some(file_name) = archive_path.file_name().and_then(|n| n.to_str()) else {
        crate::bail!("Archive path {} has no usable file name", archive_path.display());
    };

    let mut partial = tempfile::Builder::new()
        .prefix(&format!(".{file_name}."))
        .suffix(".partial")
        .tempfile_in(parent)
        .fs_context("creating temporary archive in", parent)?;

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut files = 0;
    let mut directories = 0;
    {
        let mut zip = ZipWriter::new(BufWriter::new(partial.as_file_mut()));

        let walker = walkdir::WalkDir::new(source_dir)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry?;
            let relative = entry
                .path()
                .strip_prefix(source_dir)
                .context("walked outside the bundle directory")?;
            let name = entry_name(relative)?;

            if entry.file_type().is_dir() {
                zip.add_directory(name, options)?;
                directories += 1;
            } else {
                let mut input =
                    File::open(entry.path()).fs_context("opening file to archive", entry.path())?;
                let large = input
                    .metadata()
                    .fs_context("reading metadata of", entry.path())?
                    .len()
                    >= u32::MAX as u64;
                zip.start_file(name, options.large_file(large))?;
                io::copy(&mut input, &mut zip).fs_context("archiving", entry.path())?;
                files += 1;
            }
        }

        let writer = zip.finish()?;
        writer
            .into_inner()
            .map_err(|e| e.into_error())
            .fs_context("flushing archive", archive_path)?;
    }

    partial
        .as_file()
        .sync_all()
        .fs_context("syncing archive", archive_path)?;
    partial
        .persist(archive_path)
        .map_err(|e| e.error)
        .fs_context("moving archive into place at", archive_path)?;

    Ok((files, directories))
}

/// Zip entry name: `/`-separated, relative.
fn entry_name(relative: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        let part = component
            .as_os_str()
            .to_str()
            .with_context(|| format!("{} is not valid UTF-8", relative.display()))?;
        parts.push(part);
    }
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn read_entries(path: &Path) -> Vec<(String, Vec<u8>)> {
        let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut entries = Vec::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).unwrap();
            let mut content = Vec::new();
            entry.read_to_end(&mut content).unwrap();
            entries.push((entry.name().to_string(), content));
        }
        entries
    }

    #[tokio::test]
    async fn entries_are_relative_to_bundle_root() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("langchain");
        std::fs::create_dir_all(bundle.join("langchain_core/messages")).unwrap();
        std::fs::write(bundle.join("langchain_core/__init__.py"), "").unwrap();
        std::fs::write(bundle.join("langchain_core/messages/base.py"), "class M: ...\n").unwrap();

        let archive_path = dir.path().join("langchain.zip");
        let summary = create_archive(&bundle, &archive_path).await.unwrap();

        assert_eq!(summary.files, Some(2));
        assert_eq!(summary.directories, Some(2));
        let names: Vec<_> = read_entries(&archive_path).into_iter().map(|e| e.0).collect();
        assert_eq!(
            names,
            [
                "langchain_core/",
                "langchain_core/__init__.py",
                "langchain_core/messages/",
                "langchain_core/messages/base.py",
            ]
        );
    }

    /// Relative path of every entry under `root`, with file bytes (`None` for
    /// directories), sorted by path.
    fn snapshot(root: &Path) -> Vec<(PathBuf, Option<Vec<u8>>)> {
        let mut entries: Vec<_> = walkdir::WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .map(|e| e.unwrap())
            .map(|e| {
                let relative = e.path().strip_prefix(root).unwrap().to_path_buf();
                let content = e.file_type().is_file().then(|| std::fs::read(e.path()).unwrap());
                (relative, content)
            })
            .collect();
        entries.sort();
        entries
    }

    #[tokio::test]
    async fn extracted_archive_matches_bundle_tree() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("langchain");
        std::fs::create_dir_all(bundle.join("langchain_core/messages")).unwrap();
        std::fs::create_dir_all(bundle.join("langchain_core/py.typed.d")).unwrap();
        std::fs::create_dir_all(bundle.join("langsmith-0.1.129.dist-info")).unwrap();
        std::fs::write(bundle.join("langchain_core/__init__.py"), "from . import messages\n").unwrap();
        std::fs::write(bundle.join("langchain_core/messages/base.py"), "class M: ...\n").unwrap();
        std::fs::write(bundle.join("langchain_core/data.bin"), [0u8, 159, 146, 150, 255]).unwrap();
        std::fs::write(bundle.join("langsmith-0.1.129.dist-info/RECORD"), "").unwrap();

        let archive_path = dir.path().join("langchain.zip");
        create_archive(&bundle, &archive_path).await.unwrap();

        let extracted = dir.path().join("extracted");
        zip::ZipArchive::new(File::open(&archive_path).unwrap())
            .unwrap()
            .extract(&extracted)
            .unwrap();

        let original = snapshot(&bundle);
        assert!(original.contains(&(PathBuf::from("langchain_core/py.typed.d"), None)));
        assert_eq!(snapshot(&extracted), original);
    }

    #[tokio::test]
    async fn missing_or_empty_bundle_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("langchain.zip");

        let err = create_archive(&dir.path().join("langchain"), &archive_path)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyBundle(_)));

        std::fs::create_dir(dir.path().join("langchain")).unwrap();
        let err = create_archive(&dir.path().join("langchain"), &archive_path)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyBundle(_)));
        assert!(!archive_path.exists());
    }

    #[tokio::test]
    async fn unwritable_target_leaves_no_archive() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("langchain");
        std::fs::create_dir_all(&bundle).unwrap();
        std::fs::write(bundle.join("a.py"), "").unwrap();

        let archive_path = dir.path().join("missing-dir/langchain.zip");
        assert!(create_archive(&bundle, &archive_path).await.is_err());
        assert!(!archive_path.exists());
    }

    #[tokio::test]
    async fn replaces_existing_archive() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("langchain");
        std::fs::create_dir_all(&bundle).unwrap();
        std::fs::write(bundle.join("a.py"), "x = 1\n").unwrap();
        let archive_path = dir.path().join("langchain.zip");
        std::fs::write(&archive_path, b"stale").unwrap();

        create_archive(&bundle, &archive_path).await.unwrap();

        assert_eq!(read_entries(&archive_path), [("a.py".to_string(), b"x = 1\n".to_vec())]);
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".partial"))
            .collect();
        assert!(leftovers.is_empty());
    }
}

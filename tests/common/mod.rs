//! Shared fakes for pipeline tests.

#![allow(dead_code)]

use snowpoc_bundler::bundler::{
    Error, InstallRequest, PackageInstaller, Result, Settings, SettingsBuilder, StageSettings,
    StageUploader,
};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

pub const PROJECT_NAME: &str = "demo-project";

/// Settings for a throwaway workspace with a known project name.
pub fn settings_for(workspace: &Path) -> Settings {
    SettingsBuilder::new()
        .workspace(workspace)
        .project_name(PROJECT_NAME)
        .build()
        .unwrap()
}

/// Writes what a source-only `pip install --target` would leave behind.
#[derive(Default)]
pub struct FakeInstaller {
    pub calls: AtomicUsize,
}

impl PackageInstaller for FakeInstaller {
    async fn install(&self, request: &InstallRequest<'_>) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let target = request.target_dir;

        write_distribution(target, &PROJECT_NAME.replace('-', "_"), "0.1.0");
        for pin in request.packages {
            write_distribution(target, &pin.name().replace('-', "_"), pin.version());
        }
        Ok(())
    }
}

fn write_distribution(target: &Path, module: &str, version: &str) {
    let record = target.join(format!("{module}-{version}.dist-info"));
    std::fs::create_dir_all(&record).unwrap();
    std::fs::write(record.join("METADATA"), format!("Name: {module}\nVersion: {version}\n")).unwrap();
    std::fs::write(record.join("RECORD"), "").unwrap();

    let package = target.join(module);
    std::fs::create_dir_all(&package).unwrap();
    std::fs::write(package.join("__init__.py"), format!("__version__ = \"{version}\"\n")).unwrap();
}

/// Installer failing the way pip does when a pin has no source distribution.
pub struct FailingInstaller {
    pub code: i32,
}

impl PackageInstaller for FailingInstaller {
    async fn install(&self, request: &InstallRequest<'_>) -> Result<()> {
        // pip leaves partial output behind
        std::fs::write(request.target_dir.join("partial.txt"), "half done").unwrap();
        Err(Error::ToolFailed {
            command: "pip install".to_string(),
            code: Some(self.code),
            stderr_tail: vec!["ERROR: No matching distribution found".to_string()],
        })
    }
}

/// In-memory stage keyed by `(stage, file name)`.
#[derive(Default)]
pub struct MemoryStage {
    pub objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    pub connections: Mutex<Vec<String>>,
}

impl MemoryStage {
    pub fn get(&self, stage: &str, name: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(stage.to_string(), name.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

impl StageUploader for MemoryStage {
    async fn upload(&self, archive: &Path, stage: &StageSettings) -> Result<()> {
        let bytes = std::fs::read(archive).unwrap();
        let name = archive.file_name().unwrap().to_string_lossy().into_owned();
        self.objects
            .lock()
            .unwrap()
            .insert((stage.name.clone(), name), bytes);
        self.connections.lock().unwrap().push(stage.connection.clone());
        Ok(())
    }
}

/// Uploader that must never be reached.
pub struct UnreachableStage;

impl StageUploader for UnreachableStage {
    async fn upload(&self, archive: &Path, _stage: &StageSettings) -> Result<()> {
        panic!("unexpected upload of {}", archive.display());
    }
}

/// Entry names of a zip archive, in stored order.
pub fn zip_entries(path: &Path) -> Vec<String> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

pub fn touch(path: PathBuf) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, "x").unwrap();
}

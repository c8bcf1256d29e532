//! Integration tests for the Hub public interface.
//!
//! Network and model runtime are replaced by in-process fakes: the downloader
//! serves prepared archives keyed by URL, and the runtime records the device
//! it was asked to load on.

use pumas_hub::hashing::verify_sha256_prefix;
use pumas_hub::network::file_name_from_url;
use pumas_hub::{
    DeviceScope, Downloader, Hub, HubBuilder, HubError, Kwargs, Result, Runtime, Source,
    WeightEncoding, WeightOptions,
};
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const REPO_URL: &str = "https://github.com/alice/models/archive/v1.zip";

const HUBCONF: &str = r#"{
    "doc": "Demo hub",
    "dependencies": ["vision"],
    "namespace": [
        { "name": "resnet18", "entry": { "builder": "vision.resnet18", "doc": "ResNet-18 model", "defaults": { "depth": 18 } } },
        { "name": "_build", "entry": { "builder": "vision.internal" } },
        { "name": "VERSION", "value": "1.0" },
        { "name": "lenet", "entry": { "builder": "vision.lenet" } }
    ]
}"#;

fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, data) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data.as_bytes()).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

fn repo_archive(root: &str, hubconf: &str) -> Vec<u8> {
    let dir = format!("{}/", root);
    let conf = format!("{}/hubconf.json", root);
    let readme = format!("{}/README.md", root);
    zip_bytes(&[
        (dir.as_str(), ""),
        (conf.as_str(), hubconf),
        (readme.as_str(), "# models"),
    ])
}

#[derive(Clone, Default)]
struct FakeDownloader {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeDownloader {
    fn serve(&self, url: &str, data: Vec<u8>) {
        self.files.lock().unwrap().insert(url.to_string(), data);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Downloader for FakeDownloader {
    fn download(&self, url: &str, dest_dir: &Path, hash_prefix: Option<&str>) -> Result<PathBuf> {
        self.calls.lock().unwrap().push(url.to_string());
        let data = self
            .files
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| HubError::DownloadFailed {
                url: url.to_string(),
                message: "404".to_string(),
            })?;

        std::fs::create_dir_all(dest_dir)?;
        let dest = dest_dir.join(file_name_from_url(url)?);
        std::fs::write(&dest, data)?;
        if let Some(prefix) = hash_prefix {
            if let Err(e) = verify_sha256_prefix(&dest, prefix) {
                std::fs::remove_file(&dest)?;
                return Err(e);
            }
        }
        Ok(dest)
    }
}

#[derive(Debug, PartialEq)]
struct LoadedWeights {
    path: PathBuf,
    contents: String,
    numpy: bool,
    device: String,
}

struct FakeRuntime {
    device: Mutex<String>,
    packages: Vec<&'static str>,
    fail_loads: bool,
}

impl FakeRuntime {
    fn new(packages: &[&'static str]) -> Self {
        Self {
            device: Mutex::new("cpu".to_string()),
            packages: packages.to_vec(),
            fail_loads: false,
        }
    }
}

impl Runtime for FakeRuntime {
    type Model = (String, Kwargs);
    type Weights = LoadedWeights;

    fn has_package(&self, name: &str) -> bool {
        self.packages.contains(&name)
    }

    fn build(&self, builder: &str, kwargs: &Kwargs) -> Result<Self::Model> {
        Ok((builder.to_string(), kwargs.clone()))
    }

    fn current_device(&self) -> String {
        self.device.lock().unwrap().clone()
    }

    fn set_device(&self, device: &str) -> Result<()> {
        *self.device.lock().unwrap() = device.to_string();
        Ok(())
    }

    fn load_weights(&self, path: &Path, return_numpy: bool) -> Result<Self::Weights> {
        if self.fail_loads {
            return Err(HubError::Runtime("load failed".to_string()));
        }
        Ok(LoadedWeights {
            path: path.to_path_buf(),
            contents: std::fs::read_to_string(path)?,
            numpy: return_numpy,
            device: self.current_device(),
        })
    }
}

fn create_hub(runtime: FakeRuntime) -> (TempDir, FakeDownloader, Hub<FakeRuntime>) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let downloader = FakeDownloader::default();
    let hub = HubBuilder::new()
        .home(temp_dir.path())
        .downloader(downloader.clone())
        .build(runtime)
        .unwrap();
    (temp_dir, downloader, hub)
}

fn tree_snapshot(dir: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut files: Vec<_> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(dir).unwrap().to_path_buf();
            (rel, std::fs::read(e.path()).unwrap())
        })
        .collect();
    files.sort();
    files
}

#[test]
fn test_list_fetches_and_caches_repository() {
    let (temp_dir, downloader, hub) = create_hub(FakeRuntime::new(&["vision"]));
    downloader.serve(REPO_URL, repo_archive("models-1", HUBCONF));

    let names = hub.list("alice/models:v1", Source::GitHub, false).unwrap();
    assert_eq!(names, vec!["resnet18", "lenet"]);

    let cache_dir = temp_dir.path().join("hub").join("alice_models_v1");
    assert!(cache_dir.join("hubconf.json").is_file());
    assert!(!temp_dir.path().join("hub").join("models-1").exists());
    assert!(!temp_dir.path().join("hub").join("v1.zip").exists());

    // Cache hit: no second download.
    hub.list("alice/models:v1", Source::GitHub, false).unwrap();
    assert_eq!(downloader.calls(), vec![REPO_URL]);
}

#[test]
fn test_default_branch_resolves_main() {
    let (temp_dir, downloader, hub) = create_hub(FakeRuntime::new(&[]));
    downloader.serve(
        "https://github.com/alice/models/archive/main.zip",
        repo_archive("models-main", HUBCONF),
    );

    let entry = hub.resolve_repo("alice/models", Source::GitHub, false).unwrap();
    assert_eq!(entry.normalized_key, "alice_models_main");
    assert_eq!(entry.root_dir, temp_dir.path().join("hub/alice_models_main"));
    assert!(entry.is_cached());
}

#[test]
fn test_gitee_uses_repository_archive_link() {
    let (_temp_dir, downloader, hub) = create_hub(FakeRuntime::new(&[]));
    let url = "https://gitee.com/alice/models/repository/archive/master.zip";
    downloader.serve(url, repo_archive("models-master", HUBCONF));

    let entry = hub.resolve_repo("alice/models", Source::Gitee, false).unwrap();
    assert_eq!(entry.normalized_key, "alice_models_master");
    assert_eq!(downloader.calls(), vec![url]);
}

#[test]
fn test_force_reload_is_idempotent() {
    let (temp_dir, downloader, hub) = create_hub(FakeRuntime::new(&[]));
    downloader.serve(REPO_URL, repo_archive("models-1", HUBCONF));
    let hub_dir = temp_dir.path().join("hub");

    let first = hub.resolve_repo("alice/models:v1", Source::GitHub, true).unwrap();
    let snapshot = tree_snapshot(&first.root_dir);

    // Simulate a run interrupted after clearing and partially extracting.
    std::fs::create_dir_all(hub_dir.join("models-1/partial")).unwrap();
    std::fs::write(hub_dir.join("v1.zip"), "truncated").unwrap();

    let second = hub.resolve_repo("alice/models:v1", Source::GitHub, true).unwrap();
    assert_eq!(first, second);
    assert_eq!(tree_snapshot(&second.root_dir), snapshot);
    assert!(!hub_dir.join("models-1").exists());
    assert_eq!(downloader.calls().len(), 2);
}

#[test]
fn test_download_failure_leaves_existing_cache() {
    let (temp_dir, _downloader, hub) = create_hub(FakeRuntime::new(&[]));
    let cache_dir = temp_dir.path().join("hub/alice_models_v1");
    std::fs::create_dir_all(&cache_dir).unwrap();
    std::fs::write(cache_dir.join("hubconf.json"), HUBCONF).unwrap();

    let err = hub
        .resolve_repo("alice/models:v1", Source::GitHub, true)
        .unwrap_err();
    assert!(matches!(err, HubError::DownloadFailed { .. }));
    assert!(cache_dir.join("hubconf.json").is_file());
}

#[test]
fn test_malformed_reference_is_rejected_before_download() {
    let (_temp_dir, downloader, hub) = create_hub(FakeRuntime::new(&[]));
    let err = hub.list("alice/models/extra", Source::GitHub, false).unwrap_err();
    assert!(matches!(err, HubError::MalformedReference { .. }));
    assert!(downloader.calls().is_empty());
}

#[test]
fn test_help_returns_entry_doc() {
    let (_temp_dir, downloader, hub) = create_hub(FakeRuntime::new(&[]));
    downloader.serve(REPO_URL, repo_archive("models-1", HUBCONF));

    let doc = hub
        .help("alice/models:v1", "resnet18", Source::GitHub, false)
        .unwrap();
    assert_eq!(doc.as_deref(), Some("ResNet-18 model"));

    let none = hub.help("alice/models:v1", "lenet", Source::GitHub, false).unwrap();
    assert!(none.is_none());

    assert!(matches!(
        hub.help("alice/models:v1", "VERSION", Source::GitHub, false),
        Err(HubError::EntryNotFound(_))
    ));
}

#[test]
fn test_load_invokes_entry_with_kwargs() {
    let (_temp_dir, downloader, hub) = create_hub(FakeRuntime::new(&["vision"]));
    downloader.serve(REPO_URL, repo_archive("models-1", HUBCONF));

    let mut kwargs = Kwargs::new();
    kwargs.insert("pretrained".into(), serde_json::Value::Bool(true));
    let (builder, merged) = hub
        .load("alice/models:v1", "resnet18", Source::GitHub, false, &kwargs)
        .unwrap();

    assert_eq!(builder, "vision.resnet18");
    assert_eq!(merged["depth"], 18);
    assert_eq!(merged["pretrained"], true);
}

#[test]
fn test_load_checks_dependencies_first() {
    let (_temp_dir, downloader, hub) = create_hub(FakeRuntime::new(&[]));
    downloader.serve(REPO_URL, repo_archive("models-1", HUBCONF));

    match hub.load("alice/models:v1", "resnet18", Source::GitHub, false, &Kwargs::new()) {
        Err(HubError::MissingDependency { missing }) => assert_eq!(missing, vec!["vision"]),
        other => panic!("expected missing dependency, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_local_source_uses_directory_directly() {
    let (_temp_dir, downloader, hub) = create_hub(FakeRuntime::new(&["vision"]));
    let repo = TempDir::new().unwrap();
    std::fs::write(repo.path().join("hubconf.json"), HUBCONF).unwrap();
    let repo_path = repo.path().to_str().unwrap();

    let names = hub.list(repo_path, Source::Local, false).unwrap();
    assert_eq!(names, vec!["resnet18", "lenet"]);
    assert!(downloader.calls().is_empty());
    assert!(hub.module_env().search_path().is_empty());
    assert!(!hub.module_env().is_registered("hubconf"));
}

#[test]
fn test_missing_hubconf_is_import_failure() {
    let (_temp_dir, _downloader, hub) = create_hub(FakeRuntime::new(&[]));
    let repo = TempDir::new().unwrap();
    let err = hub
        .list(repo.path().to_str().unwrap(), Source::Local, false)
        .unwrap_err();
    assert!(matches!(err, HubError::ImportFailure { .. }));
    assert!(hub.module_env().search_path().is_empty());
}

const WEIGHTS_URL: &str = "https://example.com/models/resnet18.pdparams";
const LEGACY_URL: &str = "https://example.com/models/resnet18.zip";

#[test]
fn test_current_weights_are_loaded_directly() {
    let (temp_dir, downloader, hub) = create_hub(FakeRuntime::new(&[]));
    downloader.serve(WEIGHTS_URL, b"tensor-bytes".to_vec());

    let weights = hub
        .load_state_dict_from_url(WEIGHTS_URL, &WeightOptions::new())
        .unwrap();
    let expected = temp_dir.path().join("hub/checkpoints/resnet18.pdparams");
    assert_eq!(weights.path, expected);
    assert_eq!(weights.contents, "tensor-bytes");
    assert!(!weights.numpy);

    // Present on disk: reused without downloading.
    hub.load_state_dict_from_url(WEIGHTS_URL, &WeightOptions::new())
        .unwrap();
    assert_eq!(downloader.calls().len(), 1);
}

#[test]
fn test_legacy_zip_is_extracted_before_loading() {
    let (_temp_dir, downloader, hub) = create_hub(FakeRuntime::new(&[]));
    downloader.serve(LEGACY_URL, zip_bytes(&[("resnet18.pdparams", "legacy-bytes")]));
    let model_dir = TempDir::new().unwrap();
    let options = WeightOptions::new().model_dir(model_dir.path());

    let artifact = hub.resolve_weights(LEGACY_URL, &options).unwrap();
    assert_eq!(artifact.encoding, WeightEncoding::LegacySingleFileZip);
    assert_eq!(artifact.file_path, model_dir.path().join("resnet18.zip"));
    assert_eq!(artifact.load_path, model_dir.path().join("resnet18.pdparams"));

    let weights = hub.load_state_dict_from_url(LEGACY_URL, &options).unwrap();
    assert_eq!(weights.contents, "legacy-bytes");
}

#[test]
fn test_directory_zip_is_current_format() {
    let (_temp_dir, downloader, hub) = create_hub(FakeRuntime::new(&[]));
    downloader.serve(
        LEGACY_URL,
        zip_bytes(&[("weights/", ""), ("weights/a.bin", "a")]),
    );

    let artifact = hub.resolve_weights(LEGACY_URL, &WeightOptions::new()).unwrap();
    assert_eq!(artifact.encoding, WeightEncoding::Current);
    assert_eq!(artifact.load_path, artifact.file_path);
}

#[test]
fn test_file_name_override() {
    let (temp_dir, downloader, hub) = create_hub(FakeRuntime::new(&[]));
    downloader.serve(WEIGHTS_URL, b"tensor-bytes".to_vec());

    let artifact = hub
        .resolve_weights(WEIGHTS_URL, &WeightOptions::new().file_name("custom.pdparams"))
        .unwrap();
    assert_eq!(
        artifact.file_path,
        temp_dir.path().join("hub/checkpoints/custom.pdparams")
    );
    assert!(artifact.file_path.is_file());
}

#[test]
fn test_device_scope_is_applied_and_restored() {
    let (_temp_dir, downloader, hub) = create_hub(FakeRuntime::new(&[]));
    downloader.serve(WEIGHTS_URL, b"tensor-bytes".to_vec());

    let weights = hub
        .load_state_dict_from_url(WEIGHTS_URL, &WeightOptions::new().device_scope(DeviceScope::Gpu))
        .unwrap();
    assert_eq!(weights.device, "gpu:0");
    assert_eq!(hub.runtime().current_device(), "cpu");

    let numpy = hub
        .load_state_dict_from_url(WEIGHTS_URL, &WeightOptions::new().device_scope(DeviceScope::Numpy))
        .unwrap();
    assert!(numpy.numpy);
    assert_eq!(numpy.device, "cpu");
}

#[test]
fn test_device_restored_after_failed_load() {
    let mut runtime = FakeRuntime::new(&[]);
    runtime.fail_loads = true;
    runtime.set_device("xpu:3").unwrap();
    let (_temp_dir, downloader, hub) = create_hub(runtime);
    downloader.serve(WEIGHTS_URL, b"tensor-bytes".to_vec());

    let err = hub
        .load_state_dict_from_url(WEIGHTS_URL, &WeightOptions::new().device_scope(DeviceScope::Gpu))
        .unwrap_err();
    assert!(matches!(err, HubError::Runtime(_)));
    assert_eq!(hub.runtime().current_device(), "xpu:3");
}

#[test]
fn test_check_hash_rejects_mismatch() {
    let (temp_dir, downloader, hub) = create_hub(FakeRuntime::new(&[]));
    let url = "https://example.com/models/resnet18-deadbeef.pdparams";
    downloader.serve(url, b"tensor-bytes".to_vec());

    let err = hub
        .resolve_weights(url, &WeightOptions::new().check_hash(true))
        .unwrap_err();
    assert!(matches!(err, HubError::HashMismatch { .. }));
    assert!(!temp_dir
        .path()
        .join("hub/checkpoints/resnet18-deadbeef.pdparams")
        .exists());
}

#[test]
fn test_check_hash_requires_prefix_in_name() {
    let (_temp_dir, downloader, hub) = create_hub(FakeRuntime::new(&[]));
    downloader.serve(WEIGHTS_URL, b"tensor-bytes".to_vec());

    let err = hub
        .resolve_weights(WEIGHTS_URL, &WeightOptions::new().check_hash(true))
        .unwrap_err();
    assert!(matches!(err, HubError::Config { .. }));
    assert!(downloader.calls().is_empty());
}

#[test]
fn test_slash_branch_ignores_foreign_leftover_archive() {
    let (temp_dir, downloader, hub) = create_hub(FakeRuntime::new(&[]));
    let hub_dir = temp_dir.path().join("hub");
    std::fs::create_dir_all(&hub_dir).unwrap();
    // Crashed leftover of another repository's `:v1` install.
    std::fs::write(hub_dir.join("v1.zip"), repo_archive("other-1", r#"{ "namespace": [] }"#))
        .unwrap();

    let url = "https://github.com/alice/models/archive/rel/v1.zip";
    downloader.serve(url, repo_archive("models-rel-v1", HUBCONF));

    let names = hub.list("alice/models:rel/v1", Source::GitHub, false).unwrap();
    assert_eq!(names, vec!["resnet18", "lenet"]);
    assert_eq!(downloader.calls(), vec![url]);
    assert!(!hub_dir.join("other-1").exists());
}

#[test]
fn test_corrupt_repository_download_leaves_hub_clean() {
    let (temp_dir, downloader, hub) = create_hub(FakeRuntime::new(&[]));
    downloader.serve(REPO_URL, b"not a zip".to_vec());

    let err = hub.resolve_repo("alice/models:v1", Source::GitHub, false).unwrap_err();
    assert!(matches!(err, HubError::Archive { .. }));

    let remaining: Vec<_> = std::fs::read_dir(temp_dir.path().join("hub"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert!(remaining.is_empty(), "leftovers: {:?}", remaining);
}

#[test]
fn test_legacy_member_named_like_download_survives_reload() {
    let (temp_dir, downloader, hub) = create_hub(FakeRuntime::new(&[]));
    downloader.serve(WEIGHTS_URL, zip_bytes(&[("resnet18.pdparams", "legacy-bytes")]));
    let cached = temp_dir.path().join("hub/checkpoints/resnet18.pdparams");

    let first = hub
        .load_state_dict_from_url(WEIGHTS_URL, &WeightOptions::new())
        .unwrap();
    assert_eq!(first.path, cached);
    assert_eq!(first.contents, "legacy-bytes");

    let second = hub
        .load_state_dict_from_url(WEIGHTS_URL, &WeightOptions::new())
        .unwrap();
    assert_eq!(second.contents, "legacy-bytes");
    assert_eq!(downloader.calls().len(), 1);
}

use std::fs;
use std::path::PathBuf;

use doodle::{ModelManager, ModelManagerError, ModelSource};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("doodle-tests").join(name);
    let _ = fs::remove_dir_all(&dir);
    dir
}

#[test]
fn test_model_paths() -> Result<(), Box<dyn std::error::Error>> {
    let manager = ModelManager::new(scratch_dir("paths"))?;
    let model_path = manager.get_model_path("quickdraw");
    assert!(model_path.ends_with("quickdraw/model.onnx"));
    assert!(!manager.is_model_downloaded("quickdraw"));
    Ok(())
}

#[tokio::test]
async fn test_resolve_local_path() -> Result<(), Box<dyn std::error::Error>> {
    let dir = scratch_dir("local");
    let manager = ModelManager::new(&dir)?;
    let path = dir.join("model.onnx");
    fs::write(&path, b"not really onnx")?;

    let resolved = manager.resolve(&ModelSource::Path { path: path.clone() }).await?;
    assert_eq!(resolved, path);

    let missing = manager
        .resolve(&ModelSource::Path { path: dir.join("missing.onnx") })
        .await;
    assert!(matches!(missing, Err(ModelManagerError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn test_cached_url_model_is_reused() -> Result<(), Box<dyn std::error::Error>> {
    let manager = ModelManager::new(scratch_dir("cached"))?;
    let cached = manager.get_model_path("quickdraw");
    fs::create_dir_all(cached.parent().unwrap())?;
    fs::write(&cached, b"abc")?;

    // The URL is never contacted because the cached file verifies
    let source = ModelSource::Url {
        name: "quickdraw".into(),
        url: "http://127.0.0.1:9/unreachable.onnx".into(),
        sha256: Some("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad".into()),
    };
    assert_eq!(manager.resolve(&source).await?, cached);
    Ok(())
}

#[tokio::test]
async fn test_corrupt_cache_triggers_refetch() -> Result<(), Box<dyn std::error::Error>> {
    let manager = ModelManager::new(scratch_dir("corrupt"))?;
    let cached = manager.get_model_path("quickdraw");
    fs::create_dir_all(cached.parent().unwrap())?;
    fs::write(&cached, b"corrupted data")?;

    let source = ModelSource::Url {
        name: "quickdraw".into(),
        url: "http://127.0.0.1:9/unreachable.onnx".into(),
        sha256: Some("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad".into()),
    };
    // Refetch fails against the closed port and the bad file is removed
    assert!(manager.resolve(&source).await.is_err());
    assert!(!cached.exists());
    Ok(())
}

#[test]
fn test_verify_and_remove() -> Result<(), Box<dyn std::error::Error>> {
    let manager = ModelManager::new(scratch_dir("verify"))?;
    let path = manager.get_model_path("m");
    fs::create_dir_all(path.parent().unwrap())?;
    fs::write(&path, b"abc")?;

    let upper = "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD";
    assert!(manager.verify_file(&path, upper)?);
    assert!(!manager.verify_file(&path, "00")?);

    manager.remove_download("m")?;
    assert!(!manager.is_model_downloaded("m"));
    manager.remove_download("m")?;
    Ok(())
}

use std::fs;
use std::path::Path;

use anyhow::Context as _;

pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<Option<T>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err).with_context(|| format!("read: {}", path.display())),
    };
    let value = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse json: {}", path.display()))?;
    Ok(Some(value))
}

pub fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let data = serde_json::to_vec_pretty(value).context("serialize json")?;
    write_atomic(path, &data)
}

pub fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err).with_context(|| format!("read: {}", path.display())),
    };
    let value = serde_yaml::from_str(&contents)
        .with_context(|| format!("parse yaml: {}", path.display()))?;
    Ok(Some(value))
}

pub fn write_yaml_atomic<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let data = serde_yaml::to_string(value).context("serialize yaml")?;
    write_atomic(path, data.as_bytes())
}

pub fn remove_if_exists(path: &Path) -> anyhow::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("remove: {}", path.display())),
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("path has no parent: {}", path.display()))?;
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create parent dir: {}", parent.display()))?;
    }

    let tmp_path = path.with_extension(format!("tmp.{}", uuid::Uuid::new_v4().simple()));
    fs::write(&tmp_path, data).with_context(|| format!("write tmp: {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("rename tmp to final: {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = data.len(), "persisted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Doc {
        name: String,
    }

    #[test]
    fn missing_file_reads_as_none() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let doc: Option<Doc> = read_json(&temp.path().join("nope.json"))?;
        assert!(doc.is_none());
        Ok(())
    }

    #[test]
    fn write_then_read_leaves_no_tmp_files() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let path = temp.path().join("nested").join("doc.json");
        write_json_atomic(&path, &Doc { name: "x".to_owned() })?;
        assert_eq!(read_json::<Doc>(&path)?, Some(Doc { name: "x".to_owned() }));

        let entries = fs::read_dir(path.parent().unwrap_or(temp.path()))?.count();
        assert_eq!(entries, 1);
        Ok(())
    }

    #[test]
    fn corrupt_json_is_an_error() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let path = temp.path().join("doc.json");
        fs::write(&path, "{not json")?;
        assert!(read_json::<Doc>(&path).is_err());
        Ok(())
    }
}

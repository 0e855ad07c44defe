use std::path::Path;

use crate::error::AppResult;

/// Write uploaded cover bytes under the uploads directory.
///
/// The stored name is a generated id with the original extension appended,
/// so client filenames never reach the filesystem and concurrent uploads of
/// like-named files cannot collide.
pub fn save_cover(dir: &Path, original_name: &str, bytes: &[u8]) -> AppResult<String> {
    std::fs::create_dir_all(dir)?;

    let id = uuid::Uuid::now_v7().to_string();
    let file_name = match Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(ext) => format!("{}.{}", id, ext),
        None => id,
    };

    std::fs::write(dir.join(&file_name), bytes)?;
    Ok(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_original_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let name = save_cover(tmp.path(), "cover.png", b"bytes").unwrap();
        assert!(name.ends_with(".png"));
        assert_eq!(std::fs::read(tmp.path().join(&name)).unwrap(), b"bytes");
    }

    #[test]
    fn handles_missing_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let name = save_cover(tmp.path(), "cover", b"bytes").unwrap();
        assert!(!name.contains('.'));
        assert!(tmp.path().join(&name).exists());
    }

    #[test]
    fn same_original_name_never_collides() {
        let tmp = tempfile::tempdir().unwrap();
        let a = save_cover(tmp.path(), "cover.png", b"one").unwrap();
        let b = save_cover(tmp.path(), "cover.png", b"two").unwrap();
        assert_ne!(a, b);
        assert_eq!(std::fs::read(tmp.path().join(&a)).unwrap(), b"one");
        assert_eq!(std::fs::read(tmp.path().join(&b)).unwrap(), b"two");
    }

    #[test]
    fn creates_uploads_dir_if_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested/files");
        save_cover(&dir, "cover.jpg", b"bytes").unwrap();
        assert!(dir.exists());
    }
}

//! 图片编码器 - 基础设施层
//!
//! 只负责把磁盘上的图片读进内存并转成 data URL，不关心图片的用途

use std::path::Path;

use base64::{engine::general_purpose, Engine as _};
use tracing::debug;

use crate::error::{AppError, Result};
use crate::models::ImageFile;

pub struct ImageEncoder;

impl ImageEncoder {
    /// 从磁盘读取一张图片
    pub async fn load(path: impl AsRef<Path>) -> Result<ImageFile> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::file(path.display().to_string(), e))?;

        if bytes.is_empty() {
            return Err(AppError::Validation(format!(
                "Image file is empty: {}",
                path.display()
            )));
        }

        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());

        debug!("读取图片 {} ({} 字节)", file_name, bytes.len());

        Ok(ImageFile::new(file_name, bytes))
    }

    /// 批量读取图片，保持输入顺序
    pub async fn load_all<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<ImageFile>> {
        futures::future::try_join_all(paths.iter().map(|p| Self::load(p.as_ref()))).await
    }

    /// 转成 `data:<mime>;base64,<payload>` 形式
    pub fn to_data_url(image: &ImageFile) -> String {
        format!(
            "data:{};base64,{}",
            image.mime_type,
            general_purpose::STANDARD.encode(&image.bytes)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_data_url() {
        let image = ImageFile::new("paper.png", b"hello".to_vec());
        assert_eq!(ImageEncoder::to_data_url(&image), "data:image/png;base64,aGVsbG8=");
    }

    #[tokio::test]
    async fn test_load_reads_bytes_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.jpg");
        std::fs::write(&path, [0xff, 0xd8, 0xff]).unwrap();

        let image = ImageEncoder::load(&path).await.unwrap();
        assert_eq!(image.file_name, "sheet.jpg");
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.bytes, vec![0xff, 0xd8, 0xff]);
    }

    #[tokio::test]
    async fn test_load_rejects_missing_and_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.png");
        std::fs::write(&empty, []).unwrap();

        assert!(matches!(
            ImageEncoder::load(dir.path().join("missing.png")).await,
            Err(AppError::File { .. })
        ));
        assert!(matches!(
            ImageEncoder::load(&empty).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_load_all_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<_> = ["b.png", "a.png"]
            .iter()
            .map(|name| {
                let p = dir.path().join(name);
                std::fs::write(&p, name.as_bytes()).unwrap();
                p
            })
            .collect();

        let images = ImageEncoder::load_all(&paths).await.unwrap();
        let names: Vec<_> = images.iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(names, vec!["b.png", "a.png"]);
    }
}

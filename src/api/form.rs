use reqwest::multipart::{Form, Part};
use std::path::Path;

/// 上传用的本地文件（已读入内存）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl MediaFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub async fn load(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());
        let mime_type = guess_mime(&file_name).to_string();
        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }

    pub fn is_video(&self) -> bool {
        self.mime_type.starts_with("video/")
    }
}

pub fn guess_mime(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, e)| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File(MediaFile),
}

/// multipart 表单，字段顺序与添加顺序一致
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: Vec<(String, FormValue)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_text(&mut self, name: &str, value: impl Into<String>) {
        self.fields
            .push((name.to_string(), FormValue::Text(value.into())));
    }

    pub fn append_file(&mut self, name: &str, file: MediaFile) {
        self.fields.push((name.to_string(), FormValue::File(file)));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|(k, v)| match v {
            FormValue::Text(s) if k == name => Some(s.as_str()),
            _ => None,
        })
    }

    pub fn file(&self, name: &str) -> Option<&MediaFile> {
        self.fields.iter().find_map(|(k, v)| match v {
            FormValue::File(f) if k == name => Some(f),
            _ => None,
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// 重试时需要重新构造（reqwest 的 Form 不可 Clone）
    pub fn to_multipart(&self) -> Form {
        let mut form = Form::new();
        for (name, value) in &self.fields {
            form = match value {
                FormValue::Text(s) => form.text(name.clone(), s.clone()),
                FormValue::File(f) => form.part(name.clone(), file_part(f)),
            };
        }
        form
    }
}

fn file_part(file: &MediaFile) -> Part {
    let part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
    match part.mime_str(&file.mime_type) {
        Ok(p) => p,
        Err(_) => Part::bytes(file.bytes.clone()).file_name(file.file_name.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_field_name() {
        let mut form = FormData::new();
        form.append_text("program", "p1");
        form.append_text("is_direct_branch", "true");
        form.append_file("hero_image", MediaFile::new("hero.png", "image/png", vec![1, 2]));

        assert_eq!(form.text("program"), Some("p1"));
        assert_eq!(form.text("hero_image"), None);
        assert_eq!(form.file("hero_image").map(|f| f.file_name.as_str()), Some("hero.png"));
        assert!(!form.contains("trade"));
        assert_eq!(
            form.names().collect::<Vec<_>>(),
            vec!["program", "is_direct_branch", "hero_image"]
        );
    }

    #[test]
    fn mime_guess_by_extension() {
        assert_eq!(guess_mime("lab.JPG"), "image/jpeg");
        assert_eq!(guess_mime("tour.mp4"), "video/mp4");
        assert_eq!(guess_mime("README"), "application/octet-stream");
        assert!(MediaFile::new("a.webm", guess_mime("a.webm"), vec![]).is_video());
    }

    #[tokio::test]
    async fn load_reads_bytes_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("campus.png");
        tokio::fs::write(&path, b"png").await.unwrap();

        let file = MediaFile::load(&path).await.unwrap();
        assert_eq!(file.file_name, "campus.png");
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(file.bytes, b"png".to_vec());
    }
}

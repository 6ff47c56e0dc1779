use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: String,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_predefined: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewProgram {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub is_predefined: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,
    pub name: String,
    pub code: String,
    #[serde(rename = "program", alias = "program_id")]
    pub program_id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_predefined: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTrade {
    pub name: String,
    pub code: String,
    #[serde(rename = "program")]
    pub program_id: String,
    pub description: Option<String>,
    pub is_predefined: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }

    /// 按 MIME 前缀区分，video/* 以外一律视为图片
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("video/") {
            MediaType::Video
        } else {
            MediaType::Image
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: String,
    #[serde(rename = "department", alias = "department_id")]
    pub department_id: String,
    pub media_type: MediaType,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub video: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

impl GalleryItem {
    pub fn media_url(&self) -> Option<&str> {
        match self.media_type {
            MediaType::Image => self.image.as_deref(),
            MediaType::Video => self.video.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: String,
    #[serde(rename = "program", alias = "program_id", default)]
    pub program_id: String,
    #[serde(rename = "trade", alias = "trade_id", default)]
    pub trade_id: Option<String>,
    #[serde(default)]
    pub is_direct_branch: bool,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub head_name: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub mission: Option<String>,
    #[serde(default)]
    pub vision: Option<String>,
    #[serde(default)]
    pub facilities: Vec<String>,
    #[serde(default)]
    pub programs_offered: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
    #[serde(default)]
    pub location_details: Option<String>,
    #[serde(default)]
    pub hero_image: Option<String>,
    #[serde(rename = "gallery_images", alias = "gallery", default)]
    pub gallery: Vec<GalleryItem>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Department {
    pub fn slug(&self) -> String {
        self.code.to_lowercase()
    }

    pub fn href(&self) -> String {
        department_href(&self.code)
    }
}

/// 部门页地址：/departments/{code.lower()}
pub fn department_href(code: &str) -> String {
    format!("/departments/{}", code.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn department_accepts_backend_field_names() {
        let dept: Department = serde_json::from_value(json!({
            "id": "d1",
            "program": "p1",
            "trade": null,
            "is_direct_branch": true,
            "name": "Master of Business Administration",
            "code": "MBA",
            "facilities": ["Library"],
            "gallery_images": [
                {"id": "g1", "department": "d1", "media_type": "video", "video": "/media/a.mp4"}
            ]
        }))
        .unwrap();

        assert_eq!(dept.program_id, "p1");
        assert_eq!(dept.trade_id, None);
        assert!(dept.is_direct_branch);
        assert!(dept.is_active);
        assert_eq!(dept.gallery[0].media_url(), Some("/media/a.mp4"));
        assert_eq!(dept.href(), "/departments/mba");
    }

    #[test]
    fn trade_serializes_owner_as_program() {
        let trade = Trade {
            id: "t1".into(),
            name: "B.Tech".into(),
            code: "BTECH".into(),
            program_id: "p1".into(),
            description: None,
            is_predefined: true,
            is_active: true,
        };
        let v = serde_json::to_value(&trade).unwrap();
        assert_eq!(v["program"], "p1");
        assert!(v.get("program_id").is_none());
    }

    #[test]
    fn media_type_follows_mime_prefix() {
        assert_eq!(MediaType::from_mime("video/mp4"), MediaType::Video);
        assert_eq!(MediaType::from_mime("image/png"), MediaType::Image);
        assert_eq!(MediaType::from_mime("application/octet-stream"), MediaType::Image);
    }
}

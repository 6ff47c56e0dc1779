use super::{
    ApiError, CollegeApi, Department, FormData, GalleryItem, MediaFile, MediaType, NewProgram,
    NewTrade, Program, Trade,
};
use crate::hierarchy::{self, ProgramNode};
use crate::storage::repository::{
    DepartmentRecord, DepartmentRepository, GalleryRecord, GalleryRepository, ProgramRepository,
    TradeRepository,
};
use async_trait::async_trait;
use log::{info, warn};
use regex::Regex;
use sea_orm::DatabaseConnection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

const MEDIA_URL_PREFIX: &str = "/media/";
const MAX_CODE_LEN: usize = 20;

/// code 同时是 URL slug 和 media 目录名，只允许字母数字、下划线、连字符
fn is_valid_code(code: &str) -> bool {
    static CODE: OnceLock<Regex> = OnceLock::new();
    let re = CODE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());
    code.len() <= MAX_CODE_LEN && re.is_match(code)
}

/// 进程内后端：SQLite + 本地 media 目录
#[derive(Clone)]
pub struct LocalBackend {
    db: Arc<DatabaseConnection>,
    media_root: PathBuf,
}

impl LocalBackend {
    pub fn new(db: Arc<DatabaseConnection>, media_root: impl Into<PathBuf>) -> Self {
        Self {
            db,
            media_root: media_root.into(),
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn media_root(&self) -> &Path {
        &self.media_root
    }

    /// 写入 departments/{slug}/{kind}/ 下，返回 /media/ 开头的地址
    async fn store_file(&self, slug: &str, kind: &str, file: &MediaFile) -> Result<String, ApiError> {
        let base = Path::new(&file.file_name)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "upload".to_string());
        let prefix = uuid::Uuid::new_v4().simple().to_string();
        let stored = format!("{}_{}", &prefix[..8], base);

        let relative = format!("departments/{}/{}/{}", slug, kind, stored);
        let target = self.media_root.join(&relative);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, &file.bytes).await?;
        Ok(format!("{}{}", MEDIA_URL_PREFIX, relative))
    }

    async fn remove_file(&self, url: &str) {
        let Some(relative) = url.strip_prefix(MEDIA_URL_PREFIX) else {
            return;
        };
        let path = self.media_root.join(relative);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("删除文件失败 {}: {}", path.display(), e);
            }
        }
    }

    async fn department_with_gallery(
        &self,
        model: crate::storage::entity::department::Model,
    ) -> Result<Department, ApiError> {
        let gallery = GalleryRepository::list(&self.db, Some(&model.id)).await?;
        let mut dept = Department::from(model);
        dept.gallery = gallery.into_iter().map(GalleryItem::from).collect();
        Ok(dept)
    }

    /// 把表单合并进已有记录并校验层级约束
    async fn resolve_record(
        &self,
        form: &FormData,
        existing: Option<&DepartmentRecord>,
        existing_id: Option<&str>,
    ) -> Result<DepartmentRecord, ApiError> {
        let mut record = existing.cloned().unwrap_or(DepartmentRecord {
            is_active: true,
            ..Default::default()
        });

        if let Some(program) = form.text("program") {
            record.program_id = program.trim().to_string();
        }
        // 表单带了层级字段时，缺省的 trade 即表示无 trade
        if form.contains("trade") || form.contains("is_direct_branch") {
            record.trade_id = form
                .text("trade")
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty());
        }
        if let Some(flag) = form.text("is_direct_branch") {
            record.is_direct_branch = parse_bool(flag);
        }
        if let Some(name) = form.text("name") {
            record.name = name.trim().to_string();
        }
        if let Some(code) = form.text("code") {
            record.code = code.trim().to_string();
        }
        for (field, slot) in [
            ("description", &mut record.description),
            ("head_name", &mut record.head_name),
            ("contact_email", &mut record.contact_email),
            ("mission", &mut record.mission),
            ("vision", &mut record.vision),
            ("location_details", &mut record.location_details),
        ] {
            if let Some(value) = form.text(field) {
                *slot = non_empty(value);
            }
        }
        if let Some(active) = form.text("is_active") {
            record.is_active = parse_bool(active);
        }
        for (field, slot) in [
            ("facilities", &mut record.facilities),
            ("programs_offered", &mut record.programs_offered),
            ("achievements", &mut record.achievements),
        ] {
            if let Some(raw) = form.text(field) {
                *slot = serde_json::from_str(raw).map_err(|e| {
                    ApiError::Validation(format!("{} must be a JSON array of strings: {}", field, e))
                })?;
            }
        }

        if record.name.is_empty() {
            return Err(ApiError::Validation("name is required".into()));
        }
        if record.code.is_empty() {
            return Err(ApiError::Validation("code is required".into()));
        }
        if !is_valid_code(&record.code) {
            return Err(ApiError::Validation(format!(
                "code must be at most {} letters, digits, '_' or '-'",
                MAX_CODE_LEN
            )));
        }
        if record.program_id.is_empty() {
            return Err(ApiError::Validation("program is required".into()));
        }
        if ProgramRepository::find_by_id(&self.db, &record.program_id)
            .await?
            .is_none()
        {
            return Err(ApiError::Validation(format!(
                "program {} does not exist",
                record.program_id
            )));
        }

        match (&record.trade_id, record.is_direct_branch) {
            (Some(trade_id), false) => {
                let trade = TradeRepository::find_by_id(&self.db, trade_id)
                    .await?
                    .ok_or_else(|| {
                        ApiError::Validation(format!("trade {} does not exist", trade_id))
                    })?;
                if trade.program_id != record.program_id {
                    return Err(ApiError::Validation(
                        "trade does not belong to the selected program".into(),
                    ));
                }
            }
            (None, true) => {}
            (Some(_), true) => {
                return Err(ApiError::Validation(
                    "a direct branch cannot belong to a trade".into(),
                ))
            }
            (None, false) => {
                return Err(ApiError::Validation(
                    "department must belong to a trade or be a direct branch".into(),
                ))
            }
        }

        if let Some(other) = DepartmentRepository::find_by_slug(&self.db, &record.slug()).await? {
            if Some(other.id.as_str()) != existing_id {
                return Err(ApiError::Validation(format!(
                    "department with code {} already exists",
                    record.code
                )));
            }
        }

        Ok(record)
    }
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1" | "on" | "yes")
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[async_trait]
impl CollegeApi for LocalBackend {
    async fn list_programs(&self) -> Result<Vec<Program>, ApiError> {
        let rows = ProgramRepository::list_active(&self.db).await?;
        Ok(rows.into_iter().map(Program::from).collect())
    }

    async fn get_program(&self, id: &str) -> Result<Program, ApiError> {
        ProgramRepository::find_by_id(&self.db, id)
            .await?
            .map(Program::from)
            .ok_or_else(|| ApiError::NotFound(format!("program {}", id)))
    }

    async fn program_hierarchy(&self) -> Result<Vec<ProgramNode>, ApiError> {
        let programs = self.list_programs().await?;
        let trades = self.list_trades(None).await?;
        let departments = self.list_departments().await?;
        Ok(hierarchy::assemble(programs, trades, departments))
    }

    async fn create_program(&self, program: NewProgram) -> Result<Program, ApiError> {
        let mut program = program;
        program.name = program.name.trim().to_string();
        program.code = program.code.trim().to_string();
        if program.name.is_empty() || program.code.is_empty() {
            return Err(ApiError::Validation("program name and code are required".into()));
        }
        if ProgramRepository::find_by_code(&self.db, &program.code)
            .await?
            .is_some()
        {
            return Err(ApiError::Validation(format!(
                "program with code {} already exists",
                program.code
            )));
        }
        let model = ProgramRepository::insert(&self.db, program).await?;
        info!("创建 program {} ({})", model.name, model.id);
        Ok(model.into())
    }

    async fn list_trades(&self, program_id: Option<&str>) -> Result<Vec<Trade>, ApiError> {
        let rows = TradeRepository::list_active(&self.db, program_id).await?;
        Ok(rows.into_iter().map(Trade::from).collect())
    }

    async fn get_trade(&self, id: &str) -> Result<Trade, ApiError> {
        TradeRepository::find_by_id(&self.db, id)
            .await?
            .map(Trade::from)
            .ok_or_else(|| ApiError::NotFound(format!("trade {}", id)))
    }

    async fn create_trade(&self, trade: NewTrade) -> Result<Trade, ApiError> {
        let mut trade = trade;
        trade.name = trade.name.trim().to_string();
        trade.code = trade.code.trim().to_string();
        if trade.name.is_empty() || trade.code.is_empty() {
            return Err(ApiError::Validation("trade name and code are required".into()));
        }
        if ProgramRepository::find_by_id(&self.db, &trade.program_id)
            .await?
            .is_none()
        {
            return Err(ApiError::Validation(format!(
                "program {} does not exist",
                trade.program_id
            )));
        }
        if TradeRepository::find_by_code(&self.db, &trade.program_id, &trade.code)
            .await?
            .is_some()
        {
            return Err(ApiError::Validation(format!(
                "trade with code {} already exists in this program",
                trade.code
            )));
        }
        let model = TradeRepository::insert(&self.db, trade).await?;
        info!("创建 trade {} ({})", model.name, model.id);
        Ok(model.into())
    }

    async fn list_departments(&self) -> Result<Vec<Department>, ApiError> {
        let rows = DepartmentRepository::list_all(&self.db).await?;
        Ok(rows.into_iter().map(Department::from).collect())
    }

    async fn get_department(&self, id: &str) -> Result<Department, ApiError> {
        let model = DepartmentRepository::find_by_id(&self.db, id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("department {}", id)))?;
        self.department_with_gallery(model).await
    }

    async fn create_department(&self, form: FormData) -> Result<Department, ApiError> {
        let mut record = self.resolve_record(&form, None, None).await?;
        record.hero_image = match form.file("hero_image") {
            Some(file) => Some(self.store_file(&record.slug(), "hero", file).await?),
            None => None,
        };
        let model = DepartmentRepository::insert(&self.db, record).await?;
        info!("创建部门 {} ({})", model.code, model.id);
        self.department_with_gallery(model).await
    }

    async fn update_department(&self, id: &str, form: FormData) -> Result<Department, ApiError> {
        let existing = DepartmentRepository::find_by_id(&self.db, id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("department {}", id)))?;
        let current = DepartmentRecord::from(&existing);
        let mut record = self.resolve_record(&form, Some(&current), Some(id)).await?;

        let old_hero = current.hero_image.clone();
        if let Some(file) = form.file("hero_image") {
            record.hero_image = Some(self.store_file(&record.slug(), "hero", file).await?);
        } else if form.text("remove_hero_image").map(parse_bool) == Some(true) {
            record.hero_image = None;
        }
        let replaced = old_hero.filter(|old| record.hero_image.as_deref() != Some(old.as_str()));

        let model = DepartmentRepository::update(&self.db, existing, record).await?;
        if let Some(old) = replaced {
            self.remove_file(&old).await;
        }
        info!("更新部门 {} ({})", model.code, model.id);
        self.department_with_gallery(model).await
    }

    async fn delete_department(&self, id: &str) -> Result<(), ApiError> {
        let existing = DepartmentRepository::find_by_id(&self.db, id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("department {}", id)))?;

        let gallery = GalleryRepository::delete_by_department(&self.db, id).await?;
        DepartmentRepository::delete(&self.db, id).await?;

        for item in gallery {
            if let Some(url) = item.image.as_deref().or(item.video.as_deref()) {
                self.remove_file(url).await;
            }
        }
        if let Some(hero) = existing.hero_image.as_deref() {
            self.remove_file(hero).await;
        }
        if is_valid_code(&existing.slug) {
            let folder = self.media_root.join("departments").join(&existing.slug);
            if let Err(e) = tokio::fs::remove_dir_all(&folder).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("删除部门目录失败 {}: {}", folder.display(), e);
                }
            }
        } else {
            warn!("跳过非法 slug 目录: {:?}", existing.slug);
        }
        info!("删除部门 {} ({})", existing.code, existing.id);
        Ok(())
    }

    async fn list_gallery_items(
        &self,
        department_id: Option<&str>,
    ) -> Result<Vec<GalleryItem>, ApiError> {
        let rows = GalleryRepository::list(&self.db, department_id).await?;
        Ok(rows.into_iter().map(GalleryItem::from).collect())
    }

    async fn create_gallery_item(&self, form: FormData) -> Result<GalleryItem, ApiError> {
        let department_id = form
            .text("department")
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| ApiError::Validation("department is required".into()))?;
        let department = DepartmentRepository::find_by_id(&self.db, department_id)
            .await?
            .ok_or_else(|| {
                ApiError::Validation(format!("department {} does not exist", department_id))
            })?;

        let media_type = match form.text("media_type").map(str::trim) {
            Some("video") => MediaType::Video,
            Some("image") | None => MediaType::Image,
            Some(other) => {
                return Err(ApiError::Validation(format!("unknown media_type {}", other)))
            }
        };
        let file = form.file(media_type.as_str()).ok_or_else(|| {
            ApiError::Validation(format!("{} file is required", media_type.as_str()))
        })?;
        let display_order = match form.text("display_order") {
            Some(raw) => raw.trim().parse::<i32>().map_err(|_| {
                ApiError::Validation(format!("display_order must be an integer: {}", raw))
            })?,
            None => 0,
        };

        let path = self.store_file(&department.slug, "gallery", file).await?;
        let model = GalleryRepository::insert(
            &self.db,
            GalleryRecord {
                department_id: department.id,
                media_type,
                path,
                caption: form.text("caption").and_then(non_empty),
                display_order,
            },
        )
        .await?;
        Ok(model.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{department_form, local_backend};
    use pretty_assertions::assert_eq;

    async fn ug_and_btech(api: &LocalBackend) -> (Program, Trade) {
        let programs = api.list_programs().await.unwrap();
        let ug = programs.into_iter().find(|p| p.code == "UG").unwrap();
        let btech = api
            .list_trades(Some(&ug.id))
            .await
            .unwrap()
            .into_iter()
            .find(|t| t.code == "BTECH")
            .unwrap();
        (ug, btech)
    }

    #[tokio::test]
    async fn create_under_trade_shows_up_in_hierarchy() {
        let (_dir, api) = local_backend().await;
        let (ug, btech) = ug_and_btech(&api).await;

        let form = department_form(&ug.id, Some(&btech.id), false, "Information Technology", "IT");
        let dept = api.create_department(form).await.unwrap();
        assert_eq!(dept.trade_id.as_deref(), Some(btech.id.as_str()));
        assert!(!dept.is_direct_branch);

        let tree = api.program_hierarchy().await.unwrap();
        let node = tree.iter().find(|p| p.id == ug.id).unwrap();
        let trade = node.trade(&btech.id).unwrap();
        assert!(trade.departments.iter().any(|d| d.code == "IT"));
    }

    #[tokio::test]
    async fn rejects_neither_or_both_relations() {
        let (_dir, api) = local_backend().await;
        let (ug, btech) = ug_and_btech(&api).await;

        let neither = department_form(&ug.id, None, false, "Physics", "PHY");
        assert!(matches!(
            api.create_department(neither).await,
            Err(ApiError::Validation(_))
        ));

        let both = department_form(&ug.id, Some(&btech.id), true, "Physics", "PHY");
        assert!(matches!(
            api.create_department(both).await,
            Err(ApiError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn rejects_trade_from_another_program() {
        let (_dir, api) = local_backend().await;
        let (_, btech) = ug_and_btech(&api).await;
        let pg = api
            .list_programs()
            .await
            .unwrap()
            .into_iter()
            .find(|p| p.code == "PG")
            .unwrap();

        let form = department_form(&pg.id, Some(&btech.id), false, "Robotics", "ROBO");
        assert!(matches!(
            api.create_department(form).await,
            Err(ApiError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn code_is_unique_ignoring_case() {
        let (_dir, api) = local_backend().await;
        let (ug, _) = ug_and_btech(&api).await;

        let form = department_form(&ug.id, None, true, "Another CSE", "cse");
        assert!(matches!(
            api.create_department(form).await,
            Err(ApiError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn hero_replacement_and_removal_clean_up_files() {
        let (dir, api) = local_backend().await;
        let (ug, _) = ug_and_btech(&api).await;

        let mut form = department_form(&ug.id, None, true, "Design", "DES");
        form.append_file("hero_image", MediaFile::new("hero.png", "image/png", vec![1]));
        let dept = api.create_department(form).await.unwrap();
        let first = dept.hero_image.clone().unwrap();
        assert!(first.starts_with("/media/departments/des/hero/"));
        let first_path = dir.path().join("media").join(&first["/media/".len()..]);
        assert!(first_path.exists());

        let mut replace = FormData::new();
        replace.append_file("hero_image", MediaFile::new("hero2.png", "image/png", vec![2]));
        let dept = api.update_department(&dept.id, replace).await.unwrap();
        assert_ne!(dept.hero_image.as_deref(), Some(first.as_str()));
        assert!(!first_path.exists());

        let mut remove = FormData::new();
        remove.append_text("remove_hero_image", "true");
        let dept = api.update_department(&dept.id, remove).await.unwrap();
        assert_eq!(dept.hero_image, None);
        assert_eq!(dept.name, "Design");
    }

    #[tokio::test]
    async fn delete_cascades_gallery_and_media_folder() {
        let (dir, api) = local_backend().await;
        let (ug, _) = ug_and_btech(&api).await;
        let dept = api
            .create_department(department_form(&ug.id, None, true, "Design", "DES"))
            .await
            .unwrap();

        for (order, name) in [(1, "b.mp4"), (0, "a.png")] {
            let file = MediaFile::new(name, crate::api::form::guess_mime(name), vec![0]);
            let media_type = MediaType::from_mime(&file.mime_type);
            let mut form = FormData::new();
            form.append_text("department", dept.id.clone());
            form.append_text("media_type", media_type.as_str());
            form.append_text("display_order", order.to_string());
            form.append_file(media_type.as_str(), file);
            api.create_gallery_item(form).await.unwrap();
        }

        let full = api.get_department(&dept.id).await.unwrap();
        assert_eq!(
            full.gallery.iter().map(|g| g.media_type).collect::<Vec<_>>(),
            vec![MediaType::Image, MediaType::Video]
        );

        api.delete_department(&dept.id).await.unwrap();
        assert!(matches!(
            api.get_department(&dept.id).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(api
            .list_gallery_items(Some(&dept.id))
            .await
            .unwrap()
            .is_empty());
        assert!(!dir.path().join("media/departments/des").exists());
    }

    #[tokio::test]
    async fn rejects_codes_that_are_not_slugs() {
        let (dir, api) = local_backend().await;
        let (ug, _) = ug_and_btech(&api).await;

        for code in ["..", ".", "a/b", "..\\x", "ç", "ABCDEFGHIJKLMNOPQRSTU"] {
            let mut form = department_form(&ug.id, None, true, "Sneaky", code);
            form.append_file("hero_image", MediaFile::new("hero.png", "image/png", vec![1]));
            assert!(
                matches!(api.create_department(form).await, Err(ApiError::Validation(_))),
                "code {:?} should be rejected",
                code
            );
        }
        assert!(!dir.path().join("media/hero").exists());

        let ok = department_form(&ug.id, None, true, "Bio-Tech", "BIO-TECH_2");
        assert_eq!(api.create_department(ok).await.unwrap().code, "BIO-TECH_2");
    }

    #[tokio::test]
    async fn renaming_code_to_a_path_is_rejected() {
        let (_dir, api) = local_backend().await;
        let (ug, _) = ug_and_btech(&api).await;
        let dept = api
            .create_department(department_form(&ug.id, None, true, "Design", "DES"))
            .await
            .unwrap();

        let mut rename = FormData::new();
        rename.append_text("code", "../DES");
        assert!(matches!(
            api.update_department(&dept.id, rename).await,
            Err(ApiError::Validation(_))
        ));
        assert_eq!(api.get_department(&dept.id).await.unwrap().code, "DES");
    }

    #[tokio::test]
    async fn delete_leaves_other_departments_media_alone() {
        let (dir, api) = local_backend().await;
        let (ug, _) = ug_and_btech(&api).await;

        let mut keep = department_form(&ug.id, None, true, "Design", "DES");
        keep.append_file("hero_image", MediaFile::new("hero.png", "image/png", vec![1]));
        let keep = api.create_department(keep).await.unwrap();
        let keep_hero = keep.hero_image.clone().unwrap();
        let keep_path = dir.path().join("media").join(&keep_hero["/media/".len()..]);

        let mut gone = department_form(&ug.id, None, true, "Drama", "DRAMA");
        gone.append_file("hero_image", MediaFile::new("hero.png", "image/png", vec![2]));
        let gone = api.create_department(gone).await.unwrap();

        api.delete_department(&gone.id).await.unwrap();
        assert!(!dir.path().join("media/departments/drama").exists());
        assert!(keep_path.exists());
        assert_eq!(
            api.get_department(&keep.id).await.unwrap().hero_image,
            Some(keep_hero)
        );
    }

    #[tokio::test]
    async fn trade_code_is_unique_per_program() {
        let (_dir, api) = local_backend().await;
        let (ug, _) = ug_and_btech(&api).await;

        let dup = NewTrade {
            name: "B.Tech Again".into(),
            code: "BTECH".into(),
            program_id: ug.id.clone(),
            description: None,
            is_predefined: false,
            is_active: true,
        };
        assert!(matches!(
            api.create_trade(dup).await,
            Err(ApiError::Validation(_))
        ));
    }
}

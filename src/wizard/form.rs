use super::tag_set::{ChipField, ChipInput, TagSet};
use crate::api::{Department, FormData, MediaFile};

/// 第三步里可编辑的单行文本字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    Code,
    Description,
    HeadName,
    ContactEmail,
    Mission,
    Vision,
    LocationDetails,
}

impl FormField {
    pub const ALL: [FormField; 8] = [
        FormField::Name,
        FormField::Code,
        FormField::Description,
        FormField::HeadName,
        FormField::ContactEmail,
        FormField::Mission,
        FormField::Vision,
        FormField::LocationDetails,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Code => "code",
            FormField::Description => "description",
            FormField::HeadName => "head_name",
            FormField::ContactEmail => "contact_email",
            FormField::Mission => "mission",
            FormField::Vision => "vision",
            FormField::LocationDetails => "location_details",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Department Name *",
            FormField::Code => "Department Code *",
            FormField::Description => "Description",
            FormField::HeadName => "Head of Department",
            FormField::ContactEmail => "Contact Email",
            FormField::Mission => "Mission",
            FormField::Vision => "Vision",
            FormField::LocationDetails => "Location Details",
        }
    }
}

/// 封面图的处理方式
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HeroChange {
    #[default]
    Keep,
    Replace(MediaFile),
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentForm {
    pub name: String,
    pub code: String,
    pub description: String,
    pub head_name: String,
    pub contact_email: String,
    pub mission: String,
    pub vision: String,
    pub location_details: String,
    pub is_active: bool,
    pub facilities: ChipInput,
    pub programs_offered: ChipInput,
    pub achievements: ChipInput,
    /// 编辑时已有的封面图地址
    pub existing_hero: Option<String>,
    pub hero: HeroChange,
}

impl Default for DepartmentForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            code: String::new(),
            description: String::new(),
            head_name: String::new(),
            contact_email: String::new(),
            mission: String::new(),
            vision: String::new(),
            location_details: String::new(),
            is_active: true,
            facilities: ChipInput::default(),
            programs_offered: ChipInput::default(),
            achievements: ChipInput::default(),
            existing_hero: None,
            hero: HeroChange::Keep,
        }
    }
}

impl DepartmentForm {
    pub fn from_department(dept: &Department) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            name: dept.name.clone(),
            code: dept.code.clone(),
            description: text(&dept.description),
            head_name: text(&dept.head_name),
            contact_email: text(&dept.contact_email),
            mission: text(&dept.mission),
            vision: text(&dept.vision),
            location_details: text(&dept.location_details),
            is_active: dept.is_active,
            facilities: ChipInput::with_tags(dept.facilities.iter().collect::<TagSet>()),
            programs_offered: ChipInput::with_tags(dept.programs_offered.iter().collect::<TagSet>()),
            achievements: ChipInput::with_tags(dept.achievements.iter().collect::<TagSet>()),
            existing_hero: dept.hero_image.clone(),
            hero: HeroChange::Keep,
        }
    }

    pub fn text(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Code => &self.code,
            FormField::Description => &self.description,
            FormField::HeadName => &self.head_name,
            FormField::ContactEmail => &self.contact_email,
            FormField::Mission => &self.mission,
            FormField::Vision => &self.vision,
            FormField::LocationDetails => &self.location_details,
        }
    }

    /// code 输入时即转大写
    pub fn set_text(&mut self, field: FormField, value: &str) {
        let slot = match field {
            FormField::Name => &mut self.name,
            FormField::Code => {
                self.code = value.to_uppercase();
                return;
            }
            FormField::Description => &mut self.description,
            FormField::HeadName => &mut self.head_name,
            FormField::ContactEmail => &mut self.contact_email,
            FormField::Mission => &mut self.mission,
            FormField::Vision => &mut self.vision,
            FormField::LocationDetails => &mut self.location_details,
        };
        *slot = value.to_string();
    }

    pub fn chips(&self, field: ChipField) -> &ChipInput {
        match field {
            ChipField::Facilities => &self.facilities,
            ChipField::ProgramsOffered => &self.programs_offered,
            ChipField::Achievements => &self.achievements,
        }
    }

    pub fn chips_mut(&mut self, field: ChipField) -> &mut ChipInput {
        match field {
            ChipField::Facilities => &mut self.facilities,
            ChipField::ProgramsOffered => &mut self.programs_offered,
            ChipField::Achievements => &mut self.achievements,
        }
    }

    pub fn set_hero_file(&mut self, file: MediaFile) {
        self.hero = HeroChange::Replace(file);
    }

    /// 删除标记来回切换；没有可删的封面时无效
    pub fn toggle_hero_removal(&mut self) {
        self.hero = match self.hero {
            HeroChange::Remove => HeroChange::Keep,
            _ if self.existing_hero.is_some() => HeroChange::Remove,
            _ => HeroChange::Keep,
        };
    }

    /// 提交前的必填检查，返回提示文案
    pub fn missing_required(&self) -> Option<&'static str> {
        if self.name.trim().is_empty() {
            Some("Please enter a department name")
        } else if self.code.trim().is_empty() {
            Some("Please enter a department code")
        } else {
            None
        }
    }

    /// 写入文本字段、数组字段与封面图
    pub fn append_to(&self, data: &mut FormData) {
        for field in FormField::ALL {
            data.append_text(field.key(), self.text(field));
        }
        data.append_text("is_active", if self.is_active { "true" } else { "false" });
        for field in ChipField::ALL {
            data.append_text(field.key(), self.chips(field).tags.to_json());
        }
        match &self.hero {
            HeroChange::Keep => {}
            HeroChange::Replace(file) => data.append_file("hero_image", file.clone()),
            HeroChange::Remove => data.append_text("remove_hero_image", "true"),
        }
    }
}

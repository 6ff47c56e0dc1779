use indexmap::IndexSet;

/// 部门详情里的三个字符串数组字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChipField {
    Facilities,
    ProgramsOffered,
    Achievements,
}

impl ChipField {
    pub const ALL: [ChipField; 3] = [
        ChipField::Facilities,
        ChipField::ProgramsOffered,
        ChipField::Achievements,
    ];

    /// 表单字段名
    pub fn key(&self) -> &'static str {
        match self {
            ChipField::Facilities => "facilities",
            ChipField::ProgramsOffered => "programs_offered",
            ChipField::Achievements => "achievements",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChipField::Facilities => "Facilities",
            ChipField::ProgramsOffered => "Programs Offered",
            ChipField::Achievements => "Achievements",
        }
    }
}

/// 保持插入顺序、不重复的字符串集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(IndexSet<String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 去掉首尾空白后插入；空串或已存在（精确匹配）时返回 false
    pub fn insert(&mut self, value: &str) -> bool {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return false;
        }
        self.0.insert(trimmed.to_string())
    }

    pub fn remove(&mut self, value: &str) -> bool {
        self.0.shift_remove(value)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.contains(value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.to_vec()).unwrap_or_else(|_| "[]".to_string())
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for item in iter {
            set.insert(item.as_ref());
        }
        set
    }
}

/// 待输入文本 + 已添加的标签
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChipInput {
    pub pending: String,
    pub tags: TagSet,
}

impl ChipInput {
    pub fn with_tags(tags: TagSet) -> Self {
        Self {
            pending: String::new(),
            tags,
        }
    }

    /// 添加成功才清空输入框
    pub fn commit(&mut self) -> bool {
        let added = self.tags.insert(&self.pending);
        if added {
            self.pending.clear();
        }
        added
    }
}

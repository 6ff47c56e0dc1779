/// 默认后端地址（Django REST 服务）
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// 认证相关路径
pub const PATH_LOGIN: &str = "/auth/login/";
pub const PATH_TOKEN_REFRESH: &str = "/auth/token/refresh/";

/// Program 相关路径
pub const PATH_PROGRAMS: &str = "/programs/";
pub const PATH_PROGRAM_HIERARCHY: &str = "/programs/hierarchy/";
pub fn path_program(id: &str) -> String {
    format!("{}{}/", PATH_PROGRAMS, id)
}

/// Trade 相关路径
pub const PATH_TRADES: &str = "/trades/";
pub fn path_trade(id: &str) -> String {
    format!("{}{}/", PATH_TRADES, id)
}

/// 部门相关路径
pub const PATH_DEPARTMENTS: &str = "/departments/";
pub fn path_department(id: &str) -> String {
    format!("{}{}/", PATH_DEPARTMENTS, id)
}

/// 部门图集
pub const PATH_GALLERY: &str = "/department-gallery-images/";

pub fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

pub mod department_repo;
pub mod gallery_repo;
pub mod program_repo;
pub mod trade_repo;

pub use department_repo::{DepartmentRecord, DepartmentRepository};
pub use gallery_repo::{GalleryRecord, GalleryRepository};
pub use program_repo::ProgramRepository;
pub use trade_repo::TradeRepository;

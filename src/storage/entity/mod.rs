pub mod department;
pub mod department_gallery_image;
pub mod program;
pub mod trade;

pub use department::Entity as Department;
pub use department_gallery_image::Entity as DepartmentGalleryImage;
pub use program::Entity as Program;
pub use trade::Entity as Trade;

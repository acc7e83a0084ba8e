pub mod auth_user;
pub mod pagination;

pub use auth_user::AuthUser;
pub use pagination::Pagination;

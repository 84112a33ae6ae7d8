//! Business rules. Handlers call these services; the services only know the
//! repository traits.

pub mod tasks;
pub mod users;

pub use tasks::TaskService;
pub use users::UserService;

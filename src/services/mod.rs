//! Business rules over a single unit of work. Services are cheap, borrow the
//! request's `Session`, and are built fresh for every request.

pub mod tasks;
pub mod users;

pub use tasks::TaskRegistry;
pub use users::UserDirectory;

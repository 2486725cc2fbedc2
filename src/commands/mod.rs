mod api;
mod info;
mod list;
mod util;

pub use api::api;
pub use info::info;
pub use list::list;

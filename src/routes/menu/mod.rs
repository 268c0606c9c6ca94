mod handler;
mod model;

pub use handler::{create_menu, delete_menu, get_menu, list_menus, update_menu};

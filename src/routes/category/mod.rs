mod handler;
mod model;

pub use handler::{
    create_category, delete_category, get_category, list_categories, update_category,
};
pub use model::Category;

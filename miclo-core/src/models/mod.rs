mod category;
mod comparison;
mod favorite;
mod info;
mod lenient;
mod product;

pub use category::{Category, CategoryError};
pub use comparison::ProductComparison;
pub use favorite::FavoriteMarker;
pub use info::{AboutUs, Faq, InfoRecord, Version};
pub use product::Product;

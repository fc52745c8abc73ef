pub mod genres_has_categories;

pub use genres_has_categories::GenresHasCategories;

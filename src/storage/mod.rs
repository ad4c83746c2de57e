pub mod models;
pub mod product_csv;

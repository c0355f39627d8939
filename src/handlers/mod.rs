pub mod auth;
pub mod product_form;
pub mod product_list;
pub mod products_page;

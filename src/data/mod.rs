pub mod admin;
pub mod beer;
pub mod cache;
pub mod country;
pub mod csv_source;
pub mod parse;
pub mod record;
pub mod source;
pub mod validate;
pub mod xlsx_source;
pub mod yomi;

/// Key/value session stores.
pub mod store;

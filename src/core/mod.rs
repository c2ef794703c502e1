pub mod credentials;
pub mod record;
pub mod schema;

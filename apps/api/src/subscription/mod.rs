// Newsletter subscriptions, stored as a JSON array of emails on disk.

pub mod handlers;
pub mod store;

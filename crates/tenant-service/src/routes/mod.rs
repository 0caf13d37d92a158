pub mod tenants;
pub mod webhooks;

pub mod data_source;
pub mod feed;
pub mod health;
pub mod heatmap;
pub mod http_client;
pub mod i18n;
pub mod layout;
pub mod normalize;
pub mod query;
pub mod reconcile;
pub mod refresh;
pub mod state;

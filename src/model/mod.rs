pub mod aggregate;
pub mod answer;
pub mod auth;
pub mod collector;
pub mod id;
pub mod question;
pub mod results;
pub mod store;
pub mod survey;

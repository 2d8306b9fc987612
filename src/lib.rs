#[macro_use]
extern crate log;
#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use crate::{
    config::{ConfigFairing, StoreFairing},
    logging::LoggerFairing,
};

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod render;

/// Build the server. It starts out with an empty in-memory store.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .register("/", api::catchers())
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(StoreFairing)
}

pub mod car_info;
pub mod config;
pub mod logging;

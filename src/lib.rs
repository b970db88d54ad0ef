//! Session-authenticated accounts for the gallery web application.

pub mod config;
pub mod context;
pub mod cookie;
pub mod db;
pub mod error;
pub mod routes;
pub mod state;

pub mod crypto {
    pub mod csrf;
    pub mod password;
    pub mod token;
}

pub mod models {
    pub mod password_reset;
    pub mod session;
    pub mod user;
}

pub mod repositories {
    pub mod password_reset;
    pub mod session;
    pub mod store;
    pub mod user;
}

pub mod services {
    pub mod email;
    pub mod password_reset;
    pub mod session;
    pub mod user;
}

pub mod handlers {
    pub mod auth;
}

pub mod middleware_layer {
    pub mod auth;
    pub mod csrf;
}

pub mod validation {
    pub mod auth;
}

pub mod handlers;
pub mod routes;

use tera::Tera;

use crate::bot::ChatBot;

// App state structure
pub struct AppState {
    pub tera: Tera,
    pub bot: ChatBot,
}

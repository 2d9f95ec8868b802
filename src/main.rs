#[cfg(not(target_arch = "wasm32"))]
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    use actix_files as fs;
    use actix_web::{web::Data, App, HttpServer};
    use dotenv::dotenv;
    use log::info;
    use tera::Tera;

    use chat_widget::bot::ChatBot;
    use chat_widget::config::ServerConfig;
    use chat_widget::web::{routes, AppState};

    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting chat widget server");

    let config = ServerConfig::from_env()?;

    let mut tera = Tera::new(&format!("{}/**/*", config.templates_dir))?;
    tera.autoescape_on(vec![".html"]);

    let app_state = Data::new(AppState {
        tera,
        bot: ChatBot::from_config(&config),
    });

    let static_dir = config.static_dir.clone();
    info!("Listening on http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(routes::configure)
            .service(fs::Files::new("/static", &static_dir))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}

// The widget itself starts through `#[wasm_bindgen(start)]`.
#[cfg(target_arch = "wasm32")]
fn main() {}

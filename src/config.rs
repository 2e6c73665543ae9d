/// Runtime configuration, read once at startup. `main` loads `.env` first,
/// so every knob can live there or in the real environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub mongodb_uri: String,
    pub database: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            mongodb_uri: std::env::var("MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".into()),
            database: std::env::var("MONGODB_DATABASE").unwrap_or_else(|_| "costbook".into()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(8000),
        }
    }
}

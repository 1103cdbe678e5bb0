use std::env;

pub struct Config {
    pub api_host: String,
    pub api_port: u16,
    pub database_url: String,
    pub upload_path: String,
    pub public_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        let api_port: u16 = env::var("API_PORT")
            .unwrap_or_else(|_| "4000".to_string())
            .parse()
            .unwrap_or(4000);

        Self {
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://mixtape.db?mode=rwc".to_string()),
            upload_path: env::var("UPLOAD_PATH").unwrap_or_else(|_| "uploads".to_string()),
            public_url: env::var("PUBLIC_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", api_port)),
            api_port,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

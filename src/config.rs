#[derive(Debug)]
pub struct AppConfig {
    pub db_url: String,
    pub db_namespace: String,
    pub db_database: String,
    pub db_username: Option<String>,
    pub db_password: Option<String>,
    pub listen_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let db_url = std::env::var("DB_URL").unwrap_or("mem://".to_string());
        let db_namespace = std::env::var("DB_NAMESPACE").unwrap_or("namespace".to_string());
        let db_database = std::env::var("DB_DATABASE").unwrap_or("database".to_string());
        let db_username = std::env::var("DB_USERNAME").ok();
        let db_password = std::env::var("DB_PASSWORD").ok();

        let listen_port: u16 = std::env::var("LISTEN_PORT")
            .unwrap_or("8080".to_string())
            .parse()
            .expect("LISTEN_PORT must be a number");

        Self {
            db_url,
            db_namespace,
            db_database,
            db_username,
            db_password,
            listen_port,
        }
    }
}

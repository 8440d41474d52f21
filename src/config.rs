#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: Option<String>,
    /// Create missing entity tables on startup.
    pub apply_schema: bool,
    pub log_filter: String,
}

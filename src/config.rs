use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Vacagenda";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is not set
pub fn default_log_filter() -> String {
    "vacagenda=info".to_string()
}

/// Get the application data directory
/// ~/Vacagenda/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Vacagenda")
}

/// Get the default database path
pub fn database_path() -> PathBuf {
    app_data_dir().join("vacagenda.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("Vacagenda"));
    }

    #[test]
    fn database_path_under_app_data() {
        let db = database_path();
        assert!(db.starts_with(app_data_dir()));
        assert!(db.ends_with("vacagenda.db"));
    }

    #[test]
    fn app_name_is_vacagenda() {
        assert_eq!(APP_NAME, "Vacagenda");
    }
}

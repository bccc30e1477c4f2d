pub mod env_vars {
    pub const SYS_BASEPATH: &str = "SYS_BASE_PATH";
    pub const SERVICE_BASEPATH: &str = "SERVICE_BASE_PATH";
    // relative path starting from app / service home folder
    pub const CFG_FILEPATH: &str = "CONFIG_FILE_PATH";
    pub const EXPECTED_LABELS: [&str; 3] = [SYS_BASEPATH, SERVICE_BASEPATH, CFG_FILEPATH];
}

pub mod logging {
    use serde::Deserialize;

    #[allow(clippy::upper_case_acronyms)]
    #[derive(Deserialize)]
    pub enum Level {
        TRACE,
        DEBUG,
        INFO,
        WARNING,
        ERROR,
        FATAL,
    }

    #[allow(clippy::upper_case_acronyms)]
    #[derive(Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Destination {
        CONSOLE,
        LOCALFS,
    }
}

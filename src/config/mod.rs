use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::PathBuf,
};

use directories::BaseDirs;

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        let config_path = default_config_path();
        let mut cfg = Self::from_map(default_map(), config_path.clone());

        // Read .atseprc if exists
        if config_path.exists() {
            if let Ok(file) = fs::File::open(&config_path) {
                let reader = BufReader::new(file);
                cfg.merge_lines(reader.lines().map_while(Result::ok));
            }
        }

        // Overlay environment variables (take precedence)
        for (k, v) in env::vars() {
            if is_config_key(&k) {
                cfg.inner.insert(k, v);
            }
        }

        cfg
    }

    fn from_map(inner: HashMap<String, String>, config_path: PathBuf) -> Self {
        Self { inner, config_path }
    }

    fn merge_lines<I>(&mut self, lines: I)
    where
        I: IntoIterator<Item = String>,
    {
        for line in lines {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((k, v)) = line.split_once('=') {
                self.inner.insert(k.trim().to_string(), v.trim().to_string());
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).filter(|v| !v.trim().is_empty()).cloned()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.parse::<u64>().ok())
    }

    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).map(PathBuf::from)
    }

    pub fn api_key(&self) -> Option<String> {
        self.get("GEMINI_API_KEY")
    }

    pub fn manuals_dir(&self) -> PathBuf {
        self.get_path("MANUALS_DIR")
            .unwrap_or_else(|| PathBuf::from("./manuals"))
    }

    pub fn roster_csv(&self) -> PathBuf {
        self.get_path("ROSTER_CSV")
            .unwrap_or_else(|| PathBuf::from("Personal CNSE Nacional.csv"))
    }
}

fn is_config_key(k: &str) -> bool {
    // Accept known keys or ATSEP_*/GEMINI_* for forward-compat
    const KEYS: &[&str] = &[
        "GEMINI_API_KEY",
        "GEMINI_API_BASE",
        "GEMINI_MODEL",
        "MANUALS_DIR",
        "ROSTER_CSV",
        "REQUEST_TIMEOUT",
        "POLL_INTERVAL_SECS",
        "POLL_MAX_ATTEMPTS",
        "SYSTEM_INSTRUCTION",
        "PRETTIFY_MARKDOWN",
    ];

    KEYS.contains(&k) || k.starts_with("ATSEP_") || k.starts_with("GEMINI_")
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("atsep").join(".atseprc")
}

pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "Sos el asistente técnico experto del sistema Antygravity para EANA. Respondé consultas basándote exclusivamente en los manuales técnicos adjuntos.";

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();

    // Paths
    m.insert("MANUALS_DIR".into(), "./manuals".into());
    m.insert("ROSTER_CSV".into(), "Personal CNSE Nacional.csv".into());

    // Numbers
    m.insert("REQUEST_TIMEOUT".into(), "60".into());
    m.insert("POLL_INTERVAL_SECS".into(), "2".into());

    // Strings
    m.insert(
        "GEMINI_API_BASE".into(),
        "https://generativelanguage.googleapis.com".into(),
    );
    m.insert("GEMINI_MODEL".into(), "gemini-1.5-pro".into());
    m.insert("SYSTEM_INSTRUCTION".into(), DEFAULT_SYSTEM_INSTRUCTION.into());

    // Bools as strings
    m.insert("PRETTIFY_MARKDOWN".into(), "true".into());

    m
}

#[cfg(test)]
impl Config {
    /// Defaults only, without reading the rc file or the environment.
    pub fn defaults() -> Self {
        Self::from_map(default_map(), default_config_path())
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.inner.insert(key.to_string(), value.into());
    }
}

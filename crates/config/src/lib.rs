use serde::Deserialize;

/// Top-level settings tree. Every field carries a serde default so the
/// service boots with nothing but environment overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub mongo: MongoSettings,
    pub redis: RedisSettings,
    pub auth: AuthSettings,
    pub assessment: AssessmentSettings,
    pub question_source: QuestionSourceSettings,
    pub evaluator: EvaluatorSettings,
}

impl Settings {
    /// Loads from an optional `settings.toml` in the working directory,
    /// then `LINGUAFLOW__*` environment variables (`__` as separator,
    /// e.g. `LINGUAFLOW__REDIS__URL`).
    pub fn load() -> Result<Self, config::ConfigError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name("settings").required(false))
            .add_source(config::Environment::with_prefix("LINGUAFLOW").separator("__"))
            .build()?;
        cfg.try_deserialize()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MongoSettings {
    pub uri: String,
    pub database: String,
}

impl Default for MongoSettings {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "linguaflow".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedisSettings {
    pub url: String,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HS256 secret shared with the identity service that issues tokens.
    pub jwt_secret: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: "dev-secret-change-me".to_string(),
        }
    }
}

/// Knobs for the voice assessment workflow. TTLs are independent on
/// purpose: a pending result outlives the session that produced it, and
/// the user index outlives the sessions it points at.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssessmentSettings {
    /// Questions per session when the client does not ask for a count.
    pub default_question_count: usize,
    /// Hard ceiling on questions per session.
    pub max_question_count: usize,
    pub session_ttl_secs: u64,
    pub result_ttl_secs: u64,
    /// Added on top of `session_ttl_secs` for the user-assessments index.
    pub index_ttl_slack_secs: u64,
    pub generation_timeout_secs: u64,
    pub evaluation_timeout_secs: u64,
    pub cutoffs: LevelCutoffs,
    pub recommended_course_limit: usize,
}

impl Default for AssessmentSettings {
    fn default() -> Self {
        Self {
            default_question_count: 5,
            max_question_count: 10,
            session_ttl_secs: 1800,
            result_ttl_secs: 86_400,
            index_ttl_slack_secs: 600,
            generation_timeout_secs: 30,
            evaluation_timeout_secs: 45,
            cutoffs: LevelCutoffs::default(),
            recommended_course_limit: 3,
        }
    }
}

/// Score-to-band cutoffs over the 0..=100 overall score. A score must
/// strictly exceed a cutoff to reach the band above it, so a score that
/// lands exactly on a boundary resolves to the lower band.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LevelCutoffs {
    pub a2: f64,
    pub b1: f64,
    pub b2: f64,
    pub c1: f64,
    pub c2: f64,
}

impl Default for LevelCutoffs {
    fn default() -> Self {
        Self {
            a2: 20.0,
            b1: 35.0,
            b2: 50.0,
            c1: 65.0,
            c2: 80.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuestionSourceSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for QuestionSourceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9100".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EvaluatorSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for EvaluatorSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9200".to_string(),
            timeout_secs: 45,
        }
    }
}

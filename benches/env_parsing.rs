//! Performance benchmarks for environment parsing.
//!
//! Compares a hand-written loader against `parse_env` on the same ten
//! variables, and measures the cost of building the failure report.

use criterion::{criterion_group, criterion_main, Criterion};
use preflight::prelude::*;
use std::hint::black_box;

// =============================================================================
// Manual Parsing (Baseline)
// =============================================================================

mod manual {
    use super::*;

    #[allow(dead_code)]
    pub struct Config {
        pub jwt_secret: String,
        pub database_url: String,
        pub redis_url: String,
        pub smtp_host: String,
        pub smtp_port: u16,
        pub workers: u32,
        pub debug: bool,
        pub log_level: String,
        pub allowed_origins: Vec<String>,
        pub api_key: String,
    }

    #[allow(dead_code)]
    #[derive(Debug)]
    pub struct ConfigError(String);

    fn required(env: &dyn EnvSource, name: &str) -> Result<String, ConfigError> {
        env.get_env(name)
            .ok_or_else(|| ConfigError(format!("{} is required", name)))
    }

    impl Config {
        pub fn load(env: &dyn EnvSource) -> Result<Self, ConfigError> {
            let jwt_secret = required(env, "JWT_SECRET")?;
            if jwt_secret.len() < 32 {
                return Err(ConfigError("JWT_SECRET too short".to_string()));
            }
            let smtp_port = required(env, "SMTP_PORT")?
                .parse()
                .map_err(|_| ConfigError("SMTP_PORT must be a port".to_string()))?;
            let workers = match env.get_env("WORKERS") {
                Some(w) => w
                    .parse()
                    .map_err(|_| ConfigError("WORKERS must be a number".to_string()))?,
                None => 4,
            };
            let debug = matches!(env.get_env("DEBUG").as_deref(), Some("true" | "yes" | "1"));
            let log_level = env.get_env("LOG_LEVEL").unwrap_or_else(|| "info".to_string());
            let allowed_origins = serde_json::from_str(&required(env, "ALLOWED_ORIGINS")?)
                .map_err(|e| ConfigError(e.to_string()))?;

            Ok(Self {
                jwt_secret,
                database_url: required(env, "DATABASE_URL")?,
                redis_url: required(env, "REDIS_URL")?,
                smtp_host: required(env, "SMTP_HOST")?,
                smtp_port,
                workers,
                debug,
                log_level,
                allowed_origins,
                api_key: required(env, "API_KEY")?,
            })
        }
    }
}

fn app_schema() -> EnvSchema {
    EnvSchema::new()
        .key("JWT_SECRET", schema::string().min_length(32))
        .key("DATABASE_URL", schema::string().url())
        .key("REDIS_URL", schema::string().url())
        .key("SMTP_HOST", schema::string().non_empty())
        .key("SMTP_PORT", schema::number().int().min(1.0).max(65535.0))
        .key("WORKERS", schema::number().int().positive().default_value(4))
        .key("DEBUG", schema::boolean().optional())
        .detailed(
            "LOG_LEVEL",
            DetailedKey::new(schema::enumeration(["debug", "info", "warn", "error"]))
                .fallback_default("info")
                .default_for("development", "debug"),
        )
        .key("ALLOWED_ORIGINS", schema::array(schema::string().url()).non_empty())
        .key("API_KEY", schema::string().length(40))
}

fn valid_env() -> MockEnv {
    MockEnv::new()
        .with_env("JWT_SECRET", "a".repeat(48))
        .with_env("DATABASE_URL", "postgres://db:5432/app")
        .with_env("REDIS_URL", "redis://cache:6379")
        .with_env("SMTP_HOST", "smtp.example.com")
        .with_env("SMTP_PORT", "587")
        .with_env("DEBUG", "yes")
        .with_env(
            "ALLOWED_ORIGINS",
            r#"["https://a.example.com","https://b.example.com"]"#,
        )
        .with_env("API_KEY", "k".repeat(40))
}

fn invalid_env() -> MockEnv {
    MockEnv::new()
        .with_env("JWT_SECRET", "short")
        .with_env("DATABASE_URL", "not a url")
        .with_env("SMTP_PORT", "99999")
        .with_env("DEBUG", "maybe")
        .with_env("ALLOWED_ORIGINS", "[oops")
}

fn bench_manual_parsing(c: &mut Criterion) {
    let env = valid_env();

    c.bench_function("manual_parsing", |b| {
        b.iter(|| {
            let config = manual::Config::load(black_box(&env));
            black_box(config.unwrap())
        })
    });
}

fn bench_schema_parsing(c: &mut Criterion) {
    let env = valid_env();
    let schema = app_schema();

    c.bench_function("schema_parsing", |b| {
        b.iter(|| {
            let parsed = parse_env(black_box(&schema), black_box(&env));
            black_box(parsed.unwrap())
        })
    });
}

fn bench_failure_report(c: &mut Criterion) {
    let env = invalid_env();
    let schema = app_schema();
    let mut group = c.benchmark_group("failure_report");

    group.bench_function("parse_and_render", |b| {
        b.iter(|| {
            let err = parse_env(black_box(&schema), black_box(&env)).unwrap_err();
            black_box(err.to_string())
        })
    });

    group.bench_function("check_supported", |b| {
        b.iter(|| black_box(&schema).check_supported().unwrap())
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_manual_parsing,
    bench_schema_parsing,
    bench_failure_report
);
criterion_main!(benches);

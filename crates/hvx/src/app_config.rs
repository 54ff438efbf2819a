//! 🔧 App configuration — the sacred env-to-struct pipeline.
//!
//! 🏗️ Powered by Figment, because manually parsing env vars is a form of
//! self-harm that even the borrow checker wouldn't approve of.
//!
//! 📐 DESIGN NOTE (tribal knowledge, now written down):
//!   - If `config_file_name` is None  → HVX_* env vars only. No file. No assumptions.
//!   - If `config_file_name` is Some  → env vars + TOML file, merged. TOML wins on conflicts,
//!     the way a written agreement beats a verbal one.
//!   Nobody falls back to a config file uninvited. Ancient proverb: "he who
//!   reads `hvx.toml` unprompted, debugs someone else's laptop forever."

use std::path::{Path, PathBuf};

use anyhow::Context;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
use tracing::info;

/// 📦 The AppConfig: everything the collector needs to know about itself,
/// which is more self-awareness than most collectors achieve.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// 🔑 The authentication key the upstream wants on every single
    /// request. No key, no soil facts. The bouncer checks.
    pub service_key: String,
    #[serde(default = "default_regions_file")]
    pub regions_file: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub throttle: ThrottleConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub datasets: DatasetSelection,
}

fn default_regions_file() -> PathBuf {
    PathBuf::from("sido_pnu.csv")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// 📡 Where the upstream lives and how long we're willing to wait for it.
#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// ⏱️ Upper bound on a single request, connect to last byte. After
    /// this, we stop hoping.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://apis.data.go.kr/1390802/SoilEnviron".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// 🐢 Knobs for the per-worker jittered delay ahead of each request.
///
/// The upstream publishes no rate limit; 1.0–1.1 s between requests per
/// worker is the observed safe cadence. Effective request rate scales with
/// worker count, so raise `fetch_workers` before you shave milliseconds
/// off of these. The API remembers who was rude.
#[derive(Debug, Deserialize, Clone)]
pub struct ThrottleConfig {
    #[serde(default = "default_throttle_base_ms")]
    pub base_ms: u64,
    #[serde(default = "default_throttle_jitter_ms")]
    pub jitter_ms: u64,
}

fn default_throttle_base_ms() -> u64 {
    1000
}

fn default_throttle_jitter_ms() -> u64 {
    100
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            base_ms: default_throttle_base_ms(),
            jitter_ms: default_throttle_jitter_ms(),
        }
    }
}

/// 🧵 How much of everything runs at once.
#[derive(Debug, Deserialize, Clone)]
pub struct RuntimeConfig {
    /// 🚜 Fetch workers per dataset collection.
    #[serde(default = "default_fetch_workers")]
    pub fetch_workers: usize,
    /// 🗂️ Dataset collections allowed to run at the same time.
    #[serde(default = "default_dataset_parallelism")]
    pub dataset_parallelism: usize,
    /// ✉️ Bound on the region-code queue feeding the workers.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_fetch_workers() -> usize {
    2
}

fn default_dataset_parallelism() -> usize {
    2
}

fn default_queue_capacity() -> usize {
    64
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            fetch_workers: default_fetch_workers(),
            dataset_parallelism: default_dataset_parallelism(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// 🗂️ Which parts of the catalog a run collects.
#[derive(Debug, Deserialize, Clone)]
pub struct DatasetSelection {
    /// Catalog groups to collect (1 = soil chemistry, 2 = soil
    /// characteristics).
    #[serde(default = "default_groups")]
    pub groups: Vec<u8>,
    /// 🌾 One crop-suitability dataset is added per listed crop code,
    /// e.g. `"CR005"`.
    #[serde(default)]
    pub crop_codes: Vec<String>,
}

fn default_groups() -> Vec<u8> {
    vec![1, 2]
}

impl Default for DatasetSelection {
    fn default() -> Self {
        Self {
            groups: default_groups(),
            crop_codes: Vec::new(),
        }
    }
}

/// 🚀 Load the config — from env vars, from a TOML file, or from the sheer
/// power of defaults.
///
/// 💀 Returns an error if the config is unparseable. Check the error
/// message though — it's contextual, informative, and written with love.
/// Or despair. Hard to tell at 3am.
pub fn load_config(config_file_name: Option<&Path>) -> anyhow::Result<AppConfig> {
    // 🚀 Log what we're loading — silent config resolution is how 3am
    // incidents get their origin stories.
    info!(
        "🔧 Loading configuration from {}",
        config_file_name
            .unwrap_or_else(|| Path::new("<env only>"))
            .display()
    );

    // 🏗️ Env vars as the base layer — like a good sourdough starter.
    // ALL HVX_* vars accepted. No ID required. No velvet rope.
    let config = Figment::new().merge(Env::prefixed("HVX_"));

    // 🎯 Layer in TOML only if a file was actually provided.
    let config = match config_file_name {
        Some(file_name) => config.merge(Toml::file(file_name)),
        None => config,
    };

    let context_msg = match config_file_name {
        Some(path) => format!(
            "💀 Failed to parse configuration from file '{}' plus HVX_* environment variables. One of them is lying.",
            path.display()
        ),
        None => "💀 Failed to parse configuration from HVX_* environment variables. \
                 No file in play — this one's entirely on the environment. Classic."
            .to_string(),
    };

    // ✅ or 💀, there is no try — actually there is, it's called `?`
    config.extract().context(context_msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_test_config(contents: &str) -> tempfile::NamedTempFile {
        // 🧪 A real file on disk, because Figment wants TOML from disk.
        // It's method acting.
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("💀 Failed to create a temp config file. The filesystem said 'new phone who dis'.");
        file.write_all(contents.as_bytes())
            .expect("💀 Failed to write the test config. Four lines of TOML. Four.");
        file
    }

    #[test]
    fn the_one_where_the_whole_toml_moves_in() {
        let file = write_test_config(
            r#"
            service_key = "k"
            regions_file = "regions.csv"
            output_dir = "out"

            [upstream]
            base_url = "http://localhost:9200/soil"
            timeout_secs = 5

            [throttle]
            base_ms = 0
            jitter_ms = 0

            [runtime]
            fetch_workers = 5
            dataset_parallelism = 3
            queue_capacity = 8

            [datasets]
            groups = [2]
            crop_codes = ["CR005"]
            "#,
        );

        let config = load_config(Some(file.path()))
            .expect("💀 A fully specified config should parse. It literally answered every question.");
        assert_eq!(config.service_key, "k");
        assert_eq!(config.regions_file, PathBuf::from("regions.csv"));
        assert_eq!(config.upstream.base_url, "http://localhost:9200/soil");
        assert_eq!(config.upstream.timeout_secs, 5);
        assert_eq!(config.throttle.base_ms, 0);
        assert_eq!(config.runtime.fetch_workers, 5);
        assert_eq!(config.runtime.dataset_parallelism, 3);
        assert_eq!(config.datasets.groups, vec![2]);
        assert_eq!(config.datasets.crop_codes, vec!["CR005".to_string()]);
    }

    #[test]
    fn the_one_where_defaults_show_up_uninvited_but_helpful() {
        let file = write_test_config(r#"service_key = "k""#);

        let config: AppConfig = Figment::new()
            .merge(Toml::file(file.path()))
            .extract()
            .expect("💀 Defaults should fill every omitted section. That is their whole job.");

        assert_eq!(config.regions_file, PathBuf::from("sido_pnu.csv"));
        assert_eq!(
            config.upstream.base_url,
            "http://apis.data.go.kr/1390802/SoilEnviron"
        );
        assert_eq!(config.upstream.timeout_secs, 30);
        assert_eq!(config.throttle.base_ms, 1000);
        assert_eq!(config.throttle.jitter_ms, 100);
        assert_eq!(config.runtime.fetch_workers, 2);
        assert_eq!(config.runtime.dataset_parallelism, 2);
        assert_eq!(config.runtime.queue_capacity, 64);
        assert_eq!(config.datasets.groups, vec![1, 2]);
        assert!(config.datasets.crop_codes.is_empty());
    }

    #[test]
    fn the_one_where_no_service_key_means_no_entry() {
        // 🧪 The one field with no default. The bouncer does not blink.
        let file = write_test_config(r#"regions_file = "regions.csv""#);

        let result: Result<AppConfig, _> =
            Figment::new().merge(Toml::file(file.path())).extract();
        assert!(result.is_err());
    }
}

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};

/// Environment variable naming an optional JSON configuration file.
pub const CONFIG_ENV: &str = "TARIFF_DASHBOARD_CONFIG";

// ---------------------------------------------------------------------------
// Share unit – how affected-share columns are encoded upstream
// ---------------------------------------------------------------------------

/// Unit of the `affected_trade_share` / `affected_hs6tariff_line_share`
/// columns. Source files disagree, so the rule is configured, not guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareUnit {
    /// Values above 1 are percents, everything else is already a fraction.
    #[default]
    Auto,
    /// Values are fractions in 0..=1.
    Fraction,
    /// Values are percents in 0..=100.
    Percent,
}

impl ShareUnit {
    /// Convert a raw share value into a 0..=1 fraction.
    pub fn to_fraction(self, raw: f64) -> f64 {
        match self {
            ShareUnit::Auto if raw > 1.0 => raw / 100.0,
            ShareUnit::Auto | ShareUnit::Fraction => raw,
            ShareUnit::Percent => raw / 100.0,
        }
    }
}

// ---------------------------------------------------------------------------
// SourceFormat – column layout of one tariff table
// ---------------------------------------------------------------------------

/// Column names and unit conversion for one tariff table.
///
/// `trade_value_scale` converts the trade-value column into USD; tables that
/// report thousands of USD use `1000`.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFormat {
    pub file: String,
    pub importer_column: String,
    pub exporter_column: String,
    pub code_column: String,
    pub date_column: String,
    pub tariff_column: String,
    pub trade_value_column: String,
    pub trade_value_scale: f64,
    pub affected_value_column: String,
    pub trade_share_column: String,
    pub line_share_column: String,
}

impl Default for SourceFormat {
    fn default() -> Self {
        SourceFormat {
            file: String::new(),
            importer_column: "importer".into(),
            exporter_column: "exporter".into(),
            code_column: String::new(),
            date_column: "date_eff".into(),
            tariff_column: "tariffs".into(),
            trade_value_column: "importsvaluein1000usd".into(),
            trade_value_scale: 1000.0,
            affected_value_column: "affected_trade_value".into(),
            trade_share_column: "affected_trade_share".into(),
            line_share_column: "affected_hs6tariff_line_share".into(),
        }
    }
}

impl SourceFormat {
    pub fn isic_default() -> Self {
        SourceFormat {
            file: "isic2tariff.csv".into(),
            code_column: "isic4_2".into(),
            ..Default::default()
        }
    }

    pub fn hs6_default() -> Self {
        SourceFormat {
            file: "hs6tariff.csv".into(),
            code_column: "hs6".into(),
            ..Default::default()
        }
    }
}

/// A per-table section as written in the config file. Every key is optional
/// and is laid over the table's own defaults, so `{ "trade_value_scale": 1 }`
/// keeps the file name and code column of that table.
#[derive(Debug, Default, Deserialize)]
struct SourceFormatOverride {
    file: Option<String>,
    importer_column: Option<String>,
    exporter_column: Option<String>,
    code_column: Option<String>,
    date_column: Option<String>,
    tariff_column: Option<String>,
    trade_value_column: Option<String>,
    trade_value_scale: Option<f64>,
    affected_value_column: Option<String>,
    trade_share_column: Option<String>,
    line_share_column: Option<String>,
}

impl SourceFormatOverride {
    fn apply(self, base: SourceFormat) -> SourceFormat {
        SourceFormat {
            file: self.file.unwrap_or(base.file),
            importer_column: self.importer_column.unwrap_or(base.importer_column),
            exporter_column: self.exporter_column.unwrap_or(base.exporter_column),
            code_column: self.code_column.unwrap_or(base.code_column),
            date_column: self.date_column.unwrap_or(base.date_column),
            tariff_column: self.tariff_column.unwrap_or(base.tariff_column),
            trade_value_column: self.trade_value_column.unwrap_or(base.trade_value_column),
            trade_value_scale: self.trade_value_scale.unwrap_or(base.trade_value_scale),
            affected_value_column: self
                .affected_value_column
                .unwrap_or(base.affected_value_column),
            trade_share_column: self.trade_share_column.unwrap_or(base.trade_share_column),
            line_share_column: self.line_share_column.unwrap_or(base.line_share_column),
        }
    }
}

fn isic_format<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SourceFormat, D::Error> {
    SourceFormatOverride::deserialize(deserializer).map(|o| o.apply(SourceFormat::isic_default()))
}

fn hs6_format<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SourceFormat, D::Error> {
    SourceFormatOverride::deserialize(deserializer).map(|o| o.apply(SourceFormat::hs6_default()))
}

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding all data files; relative file names resolve here.
    pub data_dir: PathBuf,
    pub exporters_file: String,
    pub isic_codes_file: String,
    pub hs6_codes_file: String,
    #[serde(deserialize_with = "isic_format")]
    pub isic_tariff: SourceFormat,
    #[serde(deserialize_with = "hs6_format")]
    pub hs6_tariff: SourceFormat,
    pub share_unit: ShareUnit,
    /// Decimal places for tariff averages in the summary table.
    pub tariff_decimals: usize,
    /// Summary table rows per page.
    pub page_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_dir: PathBuf::from("data"),
            exporters_file: "exporters.csv".into(),
            isic_codes_file: "isic4_2_product_name.csv".into(),
            hs6_codes_file: "hs6code.csv".into(),
            isic_tariff: SourceFormat::isic_default(),
            hs6_tariff: SourceFormat::hs6_default(),
            share_unit: ShareUnit::Auto,
            tariff_decimals: 3,
            page_size: 5,
        }
    }
}

impl AppConfig {
    /// Load from the file named by [`CONFIG_ENV`], or fall back to defaults.
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => {
                log::debug!("{CONFIG_ENV} not set, using default configuration");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Resolve a configured file name against `data_dir`.
    pub fn resolve(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_share_unit_uses_threshold() {
        assert_eq!(ShareUnit::Auto.to_fraction(0.25), 0.25);
        assert_eq!(ShareUnit::Auto.to_fraction(1.0), 1.0);
        assert_eq!(ShareUnit::Auto.to_fraction(25.0), 0.25);
    }

    #[test]
    fn fixed_share_units() {
        assert_eq!(ShareUnit::Fraction.to_fraction(25.0), 25.0);
        assert_eq!(ShareUnit::Percent.to_fraction(0.5), 0.005);
        assert_eq!(ShareUnit::Percent.to_fraction(50.0), 0.5);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{
            "data_dir": "/srv/tariffs",
            "share_unit": "percent",
            "hs6_tariff": { "file": "hs6.parquet", "code_column": "product", "trade_value_scale": 1 }
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/tariffs"));
        assert_eq!(config.share_unit, ShareUnit::Percent);
        assert_eq!(config.hs6_tariff.file, "hs6.parquet");
        assert_eq!(config.hs6_tariff.code_column, "product");
        assert_eq!(config.hs6_tariff.trade_value_scale, 1.0);
        assert_eq!(config.hs6_tariff.date_column, "date_eff");
        assert_eq!(config.isic_tariff, SourceFormat::isic_default());
        assert_eq!(config.page_size, 5);
        assert_eq!(config.tariff_decimals, 3);
    }

    #[test]
    fn table_override_starts_from_that_tables_defaults() {
        let json = r#"{ "hs6_tariff": { "trade_value_scale": 1 } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.hs6_tariff.trade_value_scale, 1.0);
        assert_eq!(config.hs6_tariff.file, "hs6tariff.csv");
        assert_eq!(config.hs6_tariff.code_column, "hs6");
        assert_eq!(config.hs6_tariff.tariff_column, "tariffs");

        let json = r#"{ "isic_tariff": { "date_column": "effective" } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.isic_tariff.file, "isic2tariff.csv");
        assert_eq!(config.isic_tariff.code_column, "isic4_2");
        assert_eq!(config.isic_tariff.date_column, "effective");
        assert_eq!(config.isic_tariff.trade_value_scale, 1000.0);
    }

    #[test]
    fn reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "page_size": 10 }"#).unwrap();
        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.resolve("hs6code.csv"), PathBuf::from("data/hs6code.csv"));
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(AppConfig::from_file(&path).is_err());
    }
}

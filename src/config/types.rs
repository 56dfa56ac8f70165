use serde::Deserialize;

/// Main configuration structure for the registry crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub site: SiteConfig,
    pub output: OutputConfig,
    /// Filter catalogue, crawled in declaration order
    #[serde(default, rename = "region")]
    pub regions: Vec<RegionFilter>,
}

impl Config {
    /// Flattens the catalogue into the ordered list of (region, province) filters
    pub fn filters(&self) -> Vec<Filter> {
        self.regions
            .iter()
            .flat_map(|region| {
                region.provinces.iter().map(move |province| Filter {
                    region_name: region.name.clone(),
                    region_code: region.code,
                    province_abbreviation: province.abbreviation.clone(),
                    province_name: province.name.clone(),
                    province_code: province.code,
                })
            })
            .collect()
    }
}

/// Request pacing and timeouts
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Timeout for list page requests (milliseconds); unbounded when absent
    #[serde(default, rename = "list-timeout-ms")]
    pub list_timeout_ms: Option<u64>,

    /// Timeout for detail page requests (milliseconds)
    #[serde(default = "default_detail_timeout_ms", rename = "detail-timeout-ms")]
    pub detail_timeout_ms: u64,

    /// Maximum number of detail requests in flight for one list page
    #[serde(default = "default_detail_concurrency", rename = "detail-concurrency")]
    pub detail_concurrency: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            list_timeout_ms: None,
            detail_timeout_ms: default_detail_timeout_ms(),
            detail_concurrency: default_detail_concurrency(),
        }
    }
}

fn default_detail_timeout_ms() -> u64 {
    3000
}

fn default_detail_concurrency() -> u32 {
    1
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// The two endpoints of the remote registry
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// List page endpoint, queried with region, province and offset
    #[serde(rename = "list-url")]
    pub list_url: String,

    /// Detail page endpoint, queried with the entity identifier
    #[serde(rename = "detail-url")]
    pub detail_url: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the CSV file; truncated at the start of every run
    #[serde(rename = "csv-path")]
    pub csv_path: String,

    #[serde(default)]
    pub escaping: Escaping,
}

/// How field values containing delimiters are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Escaping {
    /// Quote fields containing commas, quotes or line breaks
    #[default]
    Quoted,

    /// Join raw values with commas, never quoting
    Unescaped,
}

/// A region and its provinces
#[derive(Debug, Clone, Deserialize)]
pub struct RegionFilter {
    pub name: String,

    /// Opaque code understood by the registry's query interface
    pub code: u32,

    #[serde(default, rename = "province")]
    pub provinces: Vec<ProvinceFilter>,
}

/// A province inside a region
#[derive(Debug, Clone, Deserialize)]
pub struct ProvinceFilter {
    /// Short key such as "bo"
    pub abbreviation: String,

    pub name: String,

    /// Opaque code understood by the registry's query interface
    pub code: u32,
}

/// One (region, province) pair selecting a directory subset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub region_name: String,
    pub region_code: u32,
    pub province_abbreviation: String,
    pub province_name: String,
    pub province_code: u32,
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.region_name, self.province_name)
    }
}

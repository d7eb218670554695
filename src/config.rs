//! Runtime configuration for the Nitro Cup core.
//!
//! Built once from the environment and passed into the components that need
//! it. [`Settings::load`] honours a `.env` file; [`Settings::from_env`]
//! reads the process environment as-is.

use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Maximum number of members a team may have.
    pub team_cap: usize,
    /// Access codes that grant an elevated (organizer) session.
    pub access_codes: Vec<String>,
    /// Base URL of the external stat tracker.
    pub tracker_base: String,
    /// API key for the stat tracker, if one is configured.
    pub tracker_api_key: Option<String>,
    /// Unsigned upload endpoint of the image host.
    pub upload_endpoint: String,
    /// Upload preset name expected by the image host.
    pub upload_preset: String,
    /// Remote store endpoint override.
    pub store_url: Option<String>,
    /// Remote store credential override.
    pub store_api_key: Option<String>,
}

impl Settings {
    /// Load `.env` if one is present, then read the environment.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Settings::from_env()
    }

    pub fn from_env() -> Self {
        let team_cap = env::var("TEAM_CAP")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|n| *n >= 1)
            .unwrap_or(3);

        let access_codes = env::var("ORGANIZER_CODES")
            .map(|v| {
                v.split(',')
                    .map(|c| c.trim().to_owned())
                    .filter(|c| !c.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| vec!["rocket-admin".to_owned()]);

        let tracker_base = env::var("TRACKER_API_BASE")
            .unwrap_or_else(|_| "https://api.tracker.gg/api/v2/rocket-league".to_owned());

        let upload_endpoint = env::var("LOGO_UPLOAD_URL")
            .unwrap_or_else(|_| "https://api.cloudinary.com/v1_1/demo/image/upload".to_owned());

        let upload_preset =
            env::var("LOGO_UPLOAD_PRESET").unwrap_or_else(|_| "team-logo-upload".to_owned());

        Settings {
            team_cap,
            access_codes,
            tracker_base,
            tracker_api_key: env::var("TRACKER_API_KEY").ok(),
            upload_endpoint,
            upload_preset,
            store_url: env::var("STORE_URL").ok(),
            store_api_key: env::var("STORE_API_KEY").ok(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::from_env()
    }
}

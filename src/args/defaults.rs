pub(crate) const DEFAULT_USER_AGENT: &str = concat!(
    "s2req/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/secureta/s2http-request)"
);

pub(crate) const DEFAULT_HOST: &str = "http://localhost";

pub(crate) const DEFAULT_TIMEOUT: &str = "30s";

/// Config files picked up from the working directory when `--config` is absent.
pub(crate) const DEFAULT_CONFIG_FILES: [&str; 2] = ["s2req.toml", "s2req.json"];

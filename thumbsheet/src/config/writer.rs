//! INI serialization: `ConfigFile` → commented INI text.

use super::settings::ConfigFile;

/// Renders `config` as the commented INI written to config.ini.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[server]
; Address the HTTP server binds to
bind = {}
; Port the HTTP server listens on (the PORT environment variable overrides this)
port = {}

[upstream]
; Tile provider endpoint. Each tile request appends
; q, page, cols, rows and i to this URL's query string.
; (the UPSTREAM_URL environment variable overrides this)
url = {}
; Per-tile request timeout in seconds
timeout = {}
; Maximum upstream requests in flight across all builds
max_concurrent_fetches = {}
; User-Agent header sent with tile requests
user_agent = {}

[grid]
; Grid used when /update_sheet omits cols or rows
columns = {}
rows = {}
; Largest cols x rows a single /update_sheet request may ask for
max_cells = {}

[logging]
; Directory for the log file (relative paths resolve from the working directory)
directory = {}
file = {}
"#,
        config.server.bind,
        config.server.port,
        config.upstream.url,
        config.upstream.timeout,
        config.upstream.max_concurrent_fetches,
        config.upstream.user_agent,
        config.grid.columns,
        config.grid.rows,
        config.grid.max_cells,
        config.logging.directory.display(),
        config.logging.file,
    )
}

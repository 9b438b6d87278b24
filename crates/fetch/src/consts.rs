pub const BASE_URL: &str = "https://legacy.usacycling.org";
pub const RESULTS_URL: &str = "https://legacy.usacycling.org/results/";
pub const API_URL: &str = "https://legacy.usacycling.org/results/index.php";
pub(crate) const BROWSE_URL: &str = "https://legacy.usacycling.org/results/browse.php";

// The legacy site serves different (or no) markup to clients that don't look
// like a browser, and gates the AJAX endpoints behind a session cookie.
pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub(crate) const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
pub(crate) const ACCEPT_JSON: &str = "application/json, text/javascript, */*; q=0.01";
pub(crate) const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";
pub(crate) const SESSION_COOKIE: &str = "usacsess=jrkj6v50ftsqkboga0rgbqgrs1";

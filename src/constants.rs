pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_WS_URL: &str = "ws://127.0.0.1:8000/ws";
pub const STATE_DIR_NAME: &str = "nse-ticker";
pub const STORAGE_FILE_NAME: &str = "storage.json";

pub const TOKEN_KEY: &str = "encoded_token";
pub const ROLE_KEY: &str = "userRole";
pub const SELECTED_STOCK_KEY: &str = "selectedStock";
pub const CHART_DATA_KEY: &str = "chartData";

pub const SIGNIN_PATH: &str = "/api/auth/signin";
pub const SIGNUP_PATH: &str = "/api/auth/signup";
pub const SIDEBAR_PATH: &str = "/api/stocks/sidebar";
pub const CHART_DATA_PATH: &str = "/api/stocks/chartdata";

pub const MIN_PASSWORD_LEN: usize = 6;
pub const LIVE_REDRAW_LIMIT: usize = 50;

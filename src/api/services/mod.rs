pub mod init_db;
pub mod types;
pub mod utm_logs;

pub use init_db::InitDbService;
pub use types::{ApiError, IngestResponse, InitDbResponse};
pub use utm_logs::{UtmLogService, api_routes};

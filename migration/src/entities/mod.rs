pub mod utm_log;

pub use utm_log::Entity as UtmLogEntity;

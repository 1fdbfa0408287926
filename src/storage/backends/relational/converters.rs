//! Row <-> record conversion

use sea_orm::ActiveValue::{NotSet, Set};

use crate::storage::{UNKNOWN_USER_AGENT, UtmLog, UtmParams};
use migration::entities::utm_log;

pub fn model_to_utm_log(model: utm_log::Model) -> UtmLog {
    UtmLog {
        timestamp: model.created_at,
        params: UtmParams {
            utm_source: model.utm_source,
            utm_medium: model.utm_medium,
            utm_campaign: model.utm_campaign,
            utm_content: model.utm_content,
            utm_term: model.utm_term,
        },
        url: model.url,
        user_agent: model
            .user_agent
            .unwrap_or_else(|| UNKNOWN_USER_AGENT.to_string()),
    }
}

/// `id` is left to the database
pub fn utm_log_to_active_model(log: &UtmLog) -> utm_log::ActiveModel {
    utm_log::ActiveModel {
        id: NotSet,
        utm_source: Set(log.params.utm_source.clone()),
        utm_medium: Set(log.params.utm_medium.clone()),
        utm_campaign: Set(log.params.utm_campaign.clone()),
        utm_content: Set(log.params.utm_content.clone()),
        utm_term: Set(log.params.utm_term.clone()),
        url: Set(log.url.clone()),
        user_agent: Set(Some(log.user_agent.clone())),
        created_at: Set(log.timestamp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_null_user_agent_becomes_unknown() {
        let model = utm_log::Model {
            id: 7,
            utm_source: Some("google".into()),
            utm_medium: None,
            utm_campaign: None,
            utm_content: None,
            utm_term: None,
            url: "https://x.com".into(),
            user_agent: None,
            created_at: Utc::now(),
        };
        let log = model_to_utm_log(model);
        assert_eq!(log.user_agent, UNKNOWN_USER_AGENT);
        assert_eq!(log.params.utm_source.as_deref(), Some("google"));
    }
}

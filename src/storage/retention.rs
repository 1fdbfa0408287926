//! Fixed-count retention for whole-document stores

use super::models::UtmLog;

/// Insert `log` at the front and drop everything past `cap`
///
/// The collection is newest-first, so truncation evicts the oldest
/// insertions. A `cap` of zero is treated as one.
pub fn prepend_capped(logs: &mut Vec<UtmLog>, log: UtmLog, cap: usize) -> usize {
    logs.insert(0, log);
    let cap = cap.max(1);
    let dropped = logs.len().saturating_sub(cap);
    logs.truncate(cap);
    dropped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::UtmParams;

    fn log(n: usize) -> UtmLog {
        UtmLog::new(UtmParams::default(), format!("https://x.com/{}", n), None)
    }

    #[test]
    fn test_prepend_keeps_newest_first() {
        let mut logs = Vec::new();
        for i in 0..3 {
            prepend_capped(&mut logs, log(i), 10);
        }
        let urls: Vec<&str> = logs.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://x.com/2", "https://x.com/1", "https://x.com/0"]
        );
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut logs = Vec::new();
        let mut dropped = 0;
        for i in 0..5 {
            dropped += prepend_capped(&mut logs, log(i), 3);
        }
        assert_eq!(logs.len(), 3);
        assert_eq!(dropped, 2);
        assert_eq!(logs[0].url, "https://x.com/4");
        assert_eq!(logs[2].url, "https://x.com/2");
    }

    #[test]
    fn test_zero_cap_keeps_latest() {
        let mut logs = vec![log(0)];
        prepend_capped(&mut logs, log(1), 0);
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].url, "https://x.com/1");
    }
}

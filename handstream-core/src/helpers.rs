pub mod time {
    use std::time::{SystemTime, UNIX_EPOCH};

    /// Current time as epoch seconds, the unit the landmark wire format uses.
    pub fn now_timestamp_secs() -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64()
    }
}

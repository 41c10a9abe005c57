// Daily posting slots.
//
// The external trigger fires once a minute; a slot is due when its
// HH:MM string equals the current wall-clock minute. Duplicate slots
// with the same time are not deduplicated upstream, so matching is
// deterministic first-match-wins over the configured order.

use chrono::Local;
use serde::{Deserialize, Serialize};

/// One daily posting slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSlot {
    /// Wall-clock time as "HH:MM".
    pub time: String,
    pub enabled: bool,
    /// Per-slot message overriding the config template when non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The first enabled slot matching the given "HH:MM", if any.
pub fn matching_slot<'a>(slots: &'a [ScheduleSlot], hhmm: &str) -> Option<&'a ScheduleSlot> {
    slots.iter().find(|s| s.enabled && s.time == hhmm)
}

/// Current local wall-clock minute as "HH:MM".
pub fn current_hhmm() -> String {
    Local::now().format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(time: &str, enabled: bool, message: Option<&str>) -> ScheduleSlot {
        ScheduleSlot {
            time: time.to_string(),
            enabled,
            message: message.map(str::to_string),
        }
    }

    #[test]
    fn disabled_slots_never_match() {
        let slots = vec![slot("09:00", false, None)];
        assert!(matching_slot(&slots, "09:00").is_none());
    }

    #[test]
    fn duplicate_times_resolve_to_first_in_order() {
        let slots = vec![
            slot("09:00", true, Some("first")),
            slot("09:00", true, Some("second")),
        ];
        let hit = matching_slot(&slots, "09:00").unwrap();
        assert_eq!(hit.message.as_deref(), Some("first"));
    }

    #[test]
    fn non_matching_minute_is_quiet() {
        let slots = vec![slot("09:00", true, None), slot("21:30", true, None)];
        assert!(matching_slot(&slots, "12:15").is_none());
        assert!(matching_slot(&slots, "21:30").is_some());
    }

    #[test]
    fn slot_json_shape() {
        let parsed: ScheduleSlot =
            serde_json::from_str(r#"{"time": "08:15", "enabled": true}"#).unwrap();
        assert_eq!(parsed.time, "08:15");
        assert!(parsed.enabled);
        assert!(parsed.message.is_none());
    }
}

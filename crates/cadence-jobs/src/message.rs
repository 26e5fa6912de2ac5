//! Reminder message formatting.

use cadence_core::defaults::MINUTES_PER_HOUR;
use cadence_core::TargetType;

/// Format the human-readable text for a reminder firing `lead_minutes`
/// before its occurrence.
///
/// Lead times under an hour phrase in minutes, everything else in whole
/// hours (integer division). Events announce a starting 일정, to-dos an
/// approaching 마감.
pub fn build_message(title: &str, lead_minutes: i64, target_type: TargetType) -> String {
    let lead_minutes = lead_minutes.max(0);
    let lead = if lead_minutes < MINUTES_PER_HOUR {
        format!("{lead_minutes}분 뒤")
    } else {
        format!("{}시간 뒤", lead_minutes / MINUTES_PER_HOUR)
    };
    match target_type {
        TargetType::Event => format!("{lead} '{title}' 일정이 시작돼요"),
        TargetType::Todo => format!("{lead} '{title}' 마감이에요"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_under_an_hour() {
        assert_eq!(
            build_message("팀 회의", 30, TargetType::Event),
            "30분 뒤 '팀 회의' 일정이 시작돼요"
        );
        assert_eq!(
            build_message("보고서 제출", 59, TargetType::Todo),
            "59분 뒤 '보고서 제출' 마감이에요"
        );
    }

    #[test]
    fn test_hours_use_integer_division() {
        assert_eq!(
            build_message("스터디", 60, TargetType::Event),
            "1시간 뒤 '스터디' 일정이 시작돼요"
        );
        // 90 minutes floors to one hour.
        assert_eq!(
            build_message("스터디", 90, TargetType::Event),
            "1시간 뒤 '스터디' 일정이 시작돼요"
        );
        assert_eq!(
            build_message("마감 업무", 180, TargetType::Todo),
            "3시간 뒤 '마감 업무' 마감이에요"
        );
    }

    #[test]
    fn test_verb_differs_by_target_type() {
        let event = build_message("x", 10, TargetType::Event);
        let todo = build_message("x", 10, TargetType::Todo);
        assert!(event.contains("일정"));
        assert!(todo.contains("마감"));
    }

    #[test]
    fn test_negative_lead_clamps_to_zero() {
        assert_eq!(
            build_message("지각", -5, TargetType::Event),
            "0분 뒤 '지각' 일정이 시작돼요"
        );
    }
}

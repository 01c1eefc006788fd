use crate::error::AppError;
use crate::models::kpi::UserKpiSummary;

const HEADER: [&str; 9] = [
    "UserID",
    "From",
    "To",
    "WorkedMinutes",
    "OvertimeMinutes",
    "DaysPresent",
    "CurrentStreakDays",
    "PunctualityRate",
    "PresentNow",
];

/// Header plus one data row describing `summary`.
pub fn summary_csv(summary: &UserKpiSummary) -> Result<String, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;
    writer.write_record([
        summary.user_id.map(|id| id.to_string()).unwrap_or_default(),
        summary.from.format("%Y-%m-%d").to_string(),
        summary.to.format("%Y-%m-%d").to_string(),
        summary.worked_minutes.to_string(),
        summary.overtime_minutes.to_string(),
        summary.days_present.to_string(),
        summary.current_streak_days.to_string(),
        format!("{:.2}", summary.punctuality_rate),
        summary.present_now.to_string(),
    ])?;

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::InternalServerError(anyhow::anyhow!(e.to_string())))?;
    String::from_utf8(bytes).map_err(|e| AppError::InternalServerError(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserId;
    use chrono::NaiveDate;
    use std::str::FromStr;

    #[test]
    fn renders_header_and_single_row() {
        let user = UserId::from_str("7f1c2a4e-3b7d-4c55-9a61-0d3e8b2f9c10").unwrap();
        let summary = UserKpiSummary {
            from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            user_id: Some(user),
            worked_minutes: 930,
            overtime_minutes: 90,
            days_present: 2,
            current_streak_days: 2,
            punctuality_rate: 0.5,
            present_now: false,
            daily_worked: vec![],
        };

        let csv = summary_csv(&summary).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "UserID,From,To,WorkedMinutes,OvertimeMinutes,DaysPresent,CurrentStreakDays,PunctualityRate,PresentNow",
                "7f1c2a4e-3b7d-4c55-9a61-0d3e8b2f9c10,2024-01-01,2024-01-31,930,90,2,2,0.50,false",
            ]
        );
    }

    #[test]
    fn absent_user_leaves_id_column_empty() {
        let summary = UserKpiSummary {
            from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            user_id: None,
            worked_minutes: 0,
            overtime_minutes: 0,
            days_present: 0,
            current_streak_days: 0,
            punctuality_rate: 1.0,
            present_now: true,
            daily_worked: vec![],
        };
        let csv = summary_csv(&summary).unwrap();
        assert!(csv.ends_with(",2024-01-01,2024-01-01,0,0,0,0,1.00,true\n"));
    }
}

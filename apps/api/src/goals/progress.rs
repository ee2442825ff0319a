use chrono::{DateTime, Utc};

use super::models::{GoalStatus, JobSearchGoal};

/// Applies the completion rule: a goal that is not archived is `completed`
/// exactly when `current_value >= target_value`. `completed_at` is stamped on
/// the transition into `completed` and kept while the goal stays completed.
pub fn settle_status(goal: &mut JobSearchGoal, previous: Option<&JobSearchGoal>, now: DateTime<Utc>) {
    if goal.status == GoalStatus::Archived {
        return;
    }

    if goal.current_value >= goal.target_value {
        goal.status = GoalStatus::Completed;
        let was_completed = previous.is_some_and(|p| p.status == GoalStatus::Completed);
        if !was_completed || goal.completed_at.is_none() {
            goal.completed_at = Some(now);
        }
    } else {
        goal.status = GoalStatus::Active;
        goal.completed_at = None;
    }
}

/// Percentage of the target reached, capped at 100.
pub fn percent_complete(goal: &JobSearchGoal) -> f64 {
    if goal.target_value <= 0.0 {
        return 0.0;
    }
    (goal.current_value / goal.target_value * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn goal(current: f64, target: f64, status: GoalStatus) -> JobSearchGoal {
        JobSearchGoal {
            title: "Apply".into(),
            unit: "applications".into(),
            target_value: target,
            current_value: current,
            status,
            ..Default::default()
        }
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_reaching_target_completes() {
        let mut g = goal(10.0, 10.0, GoalStatus::Active);
        settle_status(&mut g, None, at(1));
        assert_eq!(g.status, GoalStatus::Completed);
        assert_eq!(g.completed_at, Some(at(1)));
    }

    #[test]
    fn test_completion_time_is_kept() {
        let previous = {
            let mut g = goal(10.0, 10.0, GoalStatus::Active);
            settle_status(&mut g, None, at(1));
            g
        };
        let mut again = goal(12.0, 10.0, GoalStatus::Active);
        again.completed_at = previous.completed_at;
        settle_status(&mut again, Some(&previous), at(5));
        assert_eq!(again.completed_at, Some(at(1)));
    }

    #[test]
    fn test_falling_below_target_reopens() {
        let previous = {
            let mut g = goal(10.0, 10.0, GoalStatus::Active);
            settle_status(&mut g, None, at(1));
            g
        };
        let mut g = goal(4.0, 10.0, GoalStatus::Completed);
        g.completed_at = previous.completed_at;
        settle_status(&mut g, Some(&previous), at(2));
        assert_eq!(g.status, GoalStatus::Active);
        assert_eq!(g.completed_at, None);
    }

    #[test]
    fn test_archived_is_left_alone() {
        let mut g = goal(20.0, 10.0, GoalStatus::Archived);
        settle_status(&mut g, None, at(1));
        assert_eq!(g.status, GoalStatus::Archived);
        assert_eq!(g.completed_at, None);
    }

    #[test]
    fn test_percent_complete_caps() {
        assert_eq!(percent_complete(&goal(5.0, 20.0, GoalStatus::Active)), 25.0);
        assert_eq!(percent_complete(&goal(50.0, 20.0, GoalStatus::Active)), 100.0);
    }
}

/// Where a member stands relative to their goal threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalProgress {
    pub current_point: u32,
    pub goal_point: u32,
    /// `current_point >= goal_point` with a non-zero goal
    pub reached: bool,
    /// Points still missing, zero once reached
    pub remaining: u32,
}

impl GoalProgress {
    pub fn new(current_point: u32, goal_point: u32) -> Self {
        let reached = goal_point > 0 && current_point >= goal_point;
        Self {
            current_point,
            goal_point,
            reached,
            remaining: goal_point.saturating_sub(current_point),
        }
    }
}

/// Result of one point accrual on the current member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointAccrual {
    pub previous_point: u32,
    pub current_point: u32,
    pub goal: GoalProgress,
    /// The goal became reached with exactly this accrual
    pub just_reached: bool,
}

impl PointAccrual {
    pub fn new(previous_point: u32, current_point: u32, goal_point: u32) -> Self {
        let before = GoalProgress::new(previous_point, goal_point);
        let goal = GoalProgress::new(current_point, goal_point);
        Self {
            previous_point,
            current_point,
            goal,
            just_reached: goal.reached && !before.reached,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_boundary_counts_as_reached() {
        assert!(GoalProgress::new(30, 30).reached);
        assert!(!GoalProgress::new(29, 30).reached);
        assert_eq!(GoalProgress::new(29, 30).remaining, 1);
    }

    #[test]
    fn test_zero_goal_is_never_reached() {
        let progress = GoalProgress::new(100, 0);
        assert!(!progress.reached);
        assert_eq!(progress.remaining, 0);
    }

    #[test]
    fn test_accrual_crossing_goal() {
        let accrual = PointAccrual::new(25, 35, 30);
        assert!(accrual.goal.reached);
        assert!(accrual.just_reached);
        assert_eq!(accrual.goal.remaining, 0);

        let again = PointAccrual::new(35, 40, 30);
        assert!(again.goal.reached);
        assert!(!again.just_reached);
    }
}

use crate::models::RecurrenceRule;

/// Expands "repeat for N more months" into a monthly rule.
///
/// `N` counts months *after* the first appointment, so the rule's total
/// occurrence count is `N + 1`. Zero means a single, non-recurring event.
pub fn monthly_recurrence(additional_months: u32) -> Option<RecurrenceRule> {
    if additional_months == 0 {
        return None;
    }

    Some(RecurrenceRule {
        count: additional_months.saturating_add(1),
    })
}

/// Lines for the event resource's `recurrence` field.
pub fn recurrence_lines(rule: Option<RecurrenceRule>) -> Option<Vec<String>> {
    rule.map(|rule| vec![rule.to_string()])
}

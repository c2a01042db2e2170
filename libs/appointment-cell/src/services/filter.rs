use crate::models::{EventFilters, ProjectedEvent, ALL_TREATMENTS_SENTINEL};

/// Keeps the events that satisfy every filter that is set.
pub fn apply_filters(events: Vec<ProjectedEvent>, filters: &EventFilters) -> Vec<ProjectedEvent> {
    if *filters == EventFilters::default() {
        return events;
    }

    events
        .into_iter()
        .filter(|event| matches(event, filters))
        .collect()
}

pub fn matches(event: &ProjectedEvent, filters: &EventFilters) -> bool {
    let props = &event.extended_props;

    text_matches(&props.patient_name, filters.patient.as_deref())
        && treatment_matches(&props.treatment, filters.treatment.as_deref())
        && text_matches(&props.professional, filters.professional.as_deref())
        && status_matches(event, filters.attendance_status.as_deref())
        && filters
            .date
            .as_deref()
            .map_or(true, |date| local_date(&event.start) == Some(date))
        && filters
            .time
            .as_deref()
            .map_or(true, |time| local_time(&event.start) == Some(time))
        && filters.vip.map_or(true, |vip| props.vip == vip)
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn text_matches(value: &str, needle: Option<&str>) -> bool {
    needle.map_or(true, |needle| contains_ignore_case(value, needle))
}

// The selector's "all treatments" entry is not a treatment on either side.
fn treatment_matches(value: &str, needle: Option<&str>) -> bool {
    let needle = needle.filter(|n| !n.eq_ignore_ascii_case(ALL_TREATMENTS_SENTINEL));
    let value = if value.eq_ignore_ascii_case(ALL_TREATMENTS_SENTINEL) {
        ""
    } else {
        value
    };
    text_matches(value, needle)
}

fn status_matches(event: &ProjectedEvent, needle: Option<&str>) -> bool {
    needle.map_or(true, |needle| {
        let status = event.extended_props.attendance_status;
        contains_ignore_case(status.tag(), needle) || contains_ignore_case(status.label(), needle)
    })
}

/// `YYYY-MM-DD` prefix of a local start string.
fn local_date(start: &str) -> Option<&str> {
    start.get(..10)
}

/// `HH:MM` right after the date/time separator.
fn local_time(start: &str) -> Option<&str> {
    start
        .split_once('T')
        .and_then(|(_, rest)| rest.get(..5))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttendanceStatus, ProjectedFields};

    fn event(id: &str, start: &str, patient: &str, treatment: &str) -> ProjectedEvent {
        ProjectedEvent {
            id: id.to_string(),
            title: patient.to_string(),
            start: start.to_string(),
            end: String::new(),
            color: AttendanceStatus::Unfilled.color().to_string(),
            extended_props: ProjectedFields {
                patient_name: patient.to_string(),
                age: String::new(),
                treatment: treatment.to_string(),
                notes: String::new(),
                professional: "Ana Souza".to_string(),
                vip: false,
                attendance_status: AttendanceStatus::Unfilled,
                attendance_label: AttendanceStatus::Unfilled.label().to_string(),
            },
        }
    }

    fn ids(events: &[ProjectedEvent]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    fn sample() -> Vec<ProjectedEvent> {
        vec![
            event("a", "2024-03-10T14:00:00-03:00", "João", "Pilates"),
            event("b", "2024-03-10T16:30:00-03:00", "João", "Fisioterapia"),
            event("c", "2024-03-11T09:00:00-03:00", "Maria", "Pilates"),
        ]
    }

    #[test]
    fn test_no_filters_is_identity() {
        let events = sample();
        assert_eq!(apply_filters(events.clone(), &EventFilters::default()), events);
    }

    #[test]
    fn test_exact_date() {
        let filters = EventFilters { date: Some("2024-03-10".into()), ..Default::default() };
        assert_eq!(ids(&apply_filters(sample(), &filters)), vec!["a", "b"]);

        let local = vec![
            event("x", "2024-03-10T14:00:00", "", ""),
            event("y", "2024-03-11T09:00:00", "", ""),
        ];
        assert_eq!(ids(&apply_filters(local, &filters)), vec!["x"]);
    }

    #[test]
    fn test_exact_time() {
        let filters = EventFilters { time: Some("16:30".into()), ..Default::default() };
        assert_eq!(ids(&apply_filters(sample(), &filters)), vec!["b"]);
    }

    #[test]
    fn test_conjunctive_and_case_insensitive() {
        let filters = EventFilters {
            patient: Some("JOÃO".into()),
            treatment: Some("pilates".into()),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(sample(), &filters)), vec!["a"]);

        let filters = EventFilters { professional: Some("souza".into()), ..Default::default() };
        assert_eq!(apply_filters(sample(), &filters).len(), 3);
    }

    #[test]
    fn test_all_treatments_sentinel() {
        let mut events = sample();
        events.push(event("d", "2024-03-12T10:00:00-03:00", "Pedro", ALL_TREATMENTS_SENTINEL));

        let sentinel_filter = EventFilters {
            treatment: Some(ALL_TREATMENTS_SENTINEL.into()),
            ..Default::default()
        };
        assert_eq!(apply_filters(events.clone(), &sentinel_filter).len(), 4);

        let typed = EventFilters { treatment: Some("trat".into()), ..Default::default() };
        assert!(apply_filters(events, &typed).is_empty());
    }

    #[test]
    fn test_status_matches_tag_or_label() {
        let mut events = sample();
        events[1].extended_props.attendance_status = AttendanceStatus::NoShow;

        let by_label = EventFilters { attendance_status: Some("faltou".into()), ..Default::default() };
        assert_eq!(ids(&apply_filters(events.clone(), &by_label)), vec!["b"]);

        let by_tag = EventFilters { attendance_status: Some("NAO_PREENCHIDO".into()), ..Default::default() };
        assert_eq!(ids(&apply_filters(events, &by_tag)), vec!["a", "c"]);
    }

    #[test]
    fn test_vip_filter() {
        let mut events = sample();
        events[2].extended_props.vip = true;

        let vip_only = EventFilters { vip: Some(true), ..Default::default() };
        assert_eq!(ids(&apply_filters(events.clone(), &vip_only)), vec!["c"]);

        let regular = EventFilters { vip: Some(false), ..Default::default() };
        assert_eq!(ids(&apply_filters(events, &regular)), vec!["a", "b"]);
    }

    #[test]
    fn test_malformed_filters_match_nothing() {
        for filters in [
            EventFilters { date: Some("10/03/2024".into()), ..Default::default() },
            EventFilters { date: Some("2024-3-10".into()), ..Default::default() },
            EventFilters { time: Some("2pm".into()), ..Default::default() },
            EventFilters { time: Some("14:00:00".into()), ..Default::default() },
        ] {
            assert!(apply_filters(sample(), &filters).is_empty());
        }
    }

    #[test]
    fn test_short_or_empty_start_never_panics() {
        let odd = vec![event("e", "", "", ""), event("f", "2024", "", ""), event("g", "2024-03-10T1", "", "")];
        let filters = EventFilters {
            date: Some("2024-03-10".into()),
            time: Some("14:00".into()),
            ..Default::default()
        };
        assert!(apply_filters(odd, &filters).is_empty());
    }

    #[test]
    fn test_evaluation_order_does_not_matter() {
        let combined = EventFilters {
            date: Some("2024-03-10".into()),
            treatment: Some("pilates".into()),
            ..Default::default()
        };
        let date_only = EventFilters { date: combined.date.clone(), ..Default::default() };
        let treatment_only = EventFilters { treatment: combined.treatment.clone(), ..Default::default() };

        let one_way = apply_filters(apply_filters(sample(), &date_only), &treatment_only);
        let other_way = apply_filters(apply_filters(sample(), &treatment_only), &date_only);
        assert_eq!(one_way, other_way);
        assert_eq!(one_way, apply_filters(sample(), &combined));
    }
}

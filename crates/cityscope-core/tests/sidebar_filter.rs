use cityscope_core::filter::{filter_groups, ExpansionState};
use cityscope_core::Dataset;

fn lower(s: &str) -> String {
    s.to_lowercase()
}

#[test]
fn test_paris_scenario_on_embedded_dataset() {
    let dataset = Dataset::embedded().expect("embedded dataset must parse");
    let out = filter_groups(&dataset, "par");

    let fr = out
        .iter()
        .find(|g| g.group.iso2 == "FR")
        .expect("France must match 'par' through Paris");
    assert!(!fr.country_matched);
    assert!(fr.cities.iter().any(|c| c.name == "Paris"));
    assert!(fr.cities.iter().all(|c| lower(&c.name).contains("par")));

    let mut state = ExpansionState::new();
    state.set_query("par");
    assert!(state.is_expanded(fr.group));
}

/// Every returned group matches by name or keeps only matching cities, and every
/// group that could match is present.
#[test]
fn test_filter_invariant_over_many_queries() {
    let dataset = Dataset::embedded().unwrap();

    let mut queries: Vec<String> = vec!["a".into(), "an".into(), "city".into(), "zzzz".into()];
    for group in dataset.groups.iter().take(8) {
        queries.push(group.name.chars().take(3).collect());
        if let Some(city) = group.cities.first() {
            queries.push(city.name.chars().skip(1).take(3).collect());
        }
    }

    for raw in &queries {
        let q = lower(raw.trim());
        if q.is_empty() {
            continue;
        }
        let out = filter_groups(&dataset, raw);

        for fg in &out {
            if lower(&fg.group.name).contains(&q) {
                assert!(fg.country_matched, "query {:?} group {}", raw, fg.group.name);
                assert_eq!(fg.cities.len(), fg.group.cities.len());
            } else {
                assert!(!fg.cities.is_empty());
                for c in &fg.cities {
                    assert!(lower(&c.name).contains(&q), "query {:?} city {}", raw, c.name);
                }
            }
        }

        let expected = dataset
            .groups
            .iter()
            .filter(|g| {
                lower(&g.name).contains(&q) || g.cities.iter().any(|c| lower(&c.name).contains(&q))
            })
            .count();
        assert_eq!(out.len(), expected, "query {:?}", raw);
    }
}

#[test]
fn test_clearing_query_restores_single_open_mode() {
    let dataset = Dataset::embedded().unwrap();
    let first = &dataset.groups[0];
    let second = &dataset.groups[1];

    let mut state = ExpansionState::new();
    state.toggle(first);
    state.set_query(&second.name);
    assert!(state.is_expanded(second));

    state.set_query("");
    assert!(state.query().is_none());
    assert!(state.is_expanded(first));
    assert!(!state.is_expanded(second));

    state.toggle(second);
    assert!(!state.is_expanded(first));
    assert!(state.is_expanded(second));
}

use super::*;

fn plan(text: &str) -> Vec<(String, u8, &'static str)> {
    build_query_plan(text, "Australia")
        .candidates
        .into_iter()
        .map(|c| (c.query, c.level, c.description))
        .collect()
}

fn queries(text: &str) -> Vec<String> {
    plan(text).into_iter().map(|(q, _, _)| q).collect()
}

#[test]
fn plain_street_address() {
    assert_eq!(
        plan("12 George St, Sydney, NSW"),
        vec![
            ("12 George St, Sydney, NSW".to_owned(), 0, EXACT_ADDRESS),
            ("George St, Sydney, NSW".to_owned(), 2, STREET_WITH_SUBURB),
            ("Sydney, NSW".to_owned(), 3, SUBURB_AND_STATE),
            ("NSW, Australia".to_owned(), 4, STATE_ONLY),
        ]
    );
}

#[test]
fn unit_prefix_in_its_own_component() {
    assert_eq!(
        queries("Shop 4, 12 George St, Sydney, NSW"),
        vec![
            "Shop 4, 12 George St, Sydney, NSW",
            "12 George St, Sydney, NSW",
            "George St, Sydney, NSW",
            "Sydney, NSW",
            "NSW, Australia",
        ]
    );
    let levels: Vec<u8> = plan("Shop 4, 12 George St, Sydney, NSW")
        .into_iter()
        .map(|(_, level, _)| level)
        .collect();
    assert_eq!(levels, vec![0, 1, 2, 3, 4]);
}

#[test]
fn unit_prefix_inline_is_case_insensitive() {
    let p = plan("UNIT 7b 45 Smith Street, Fitzroy, VIC");
    assert_eq!(
        p[1],
        ("45 Smith Street, Fitzroy, VIC".to_owned(), 1, WITHOUT_UNIT)
    );
    assert_eq!(
        p[2],
        ("Smith Street, Fitzroy, VIC".to_owned(), 2, STREET_WITH_SUBURB)
    );
}

#[test]
fn unit_slash_form_is_stripped() {
    let p = plan("3/15 Smith St, Fitzroy, VIC");
    assert_eq!(p[1], ("15 Smith St, Fitzroy, VIC".to_owned(), 1, WITHOUT_UNIT));
    assert_eq!(
        p[2],
        ("Smith St, Fitzroy, VIC".to_owned(), 2, STREET_WITH_SUBURB)
    );
}

#[test]
fn no_unit_query_when_nothing_stripped() {
    assert!(plan("12 George St, Sydney, NSW")
        .iter()
        .all(|(_, _, d)| *d != WITHOUT_UNIT));
}

#[test]
fn two_part_address_has_no_street_queries() {
    assert_eq!(
        plan("Parramatta, NSW"),
        vec![
            ("Parramatta, NSW".to_owned(), 3, SUBURB_AND_STATE),
            ("NSW, Australia".to_owned(), 4, STATE_ONLY),
        ]
    );
}

#[test]
fn single_part_address_is_exact_only() {
    assert_eq!(
        plan("Parramatta"),
        vec![("Parramatta".to_owned(), 0, EXACT_ADDRESS)]
    );
}

#[test]
fn short_street_remainder_skips_street_level_query() {
    let p = plan("5 A, Town, VIC");
    assert!(p.iter().all(|(_, level, _)| *level != 2), "got {p:?}");
    assert_eq!(
        queries("5 A, Town, VIC"),
        vec!["5 A, Town, VIC", "Town, VIC", "VIC, Australia"]
    );
}

#[test]
fn street_without_number_skips_street_level_query() {
    let p = plan("Old Northern Road, Dural, NSW");
    assert!(p.iter().all(|(_, level, _)| *level != 2), "got {p:?}");
}

#[test]
fn number_range_is_removed() {
    let p = plan("6-14 Castle St, Castle Hill, NSW");
    assert_eq!(
        p[1],
        ("Castle St, Castle Hill, NSW".to_owned(), 2, STREET_WITH_SUBURB)
    );
}

#[test]
fn shopping_centre_venue_is_searched_with_suburb() {
    assert_eq!(
        plan("Shop 3, Castle Towers Shopping Centre, 6-14 Castle St, Castle Hill, NSW"),
        vec![
            (
                "Shop 3, Castle Towers Shopping Centre, 6-14 Castle St, Castle Hill, NSW".to_owned(),
                0,
                EXACT_ADDRESS
            ),
            (
                "Castle Towers Shopping Centre, 6-14 Castle St, Castle Hill, NSW".to_owned(),
                1,
                WITHOUT_UNIT
            ),
            (
                "Castle Towers Shopping Centre, Castle Hill, NSW".to_owned(),
                1,
                SHOPPING_CENTRE
            ),
            ("Castle St, Castle Hill, NSW".to_owned(), 2, STREET_WITH_SUBURB),
            ("Castle Hill, NSW".to_owned(), 3, SUBURB_AND_STATE),
            ("NSW, Australia".to_owned(), 4, STATE_ONLY),
        ]
    );
}

#[test]
fn venue_duplicate_of_unit_query_is_dropped() {
    let p = plan("Shop 12 Westfield Shopping Centre, Parramatta, NSW 2150");
    let venue_queries = p.iter().filter(|(_, _, d)| *d == SHOPPING_CENTRE).count();
    assert_eq!(venue_queries, 0, "got {p:?}");
    assert_eq!(
        p[1],
        (
            "Westfield Shopping Centre, Parramatta, NSW 2150".to_owned(),
            1,
            WITHOUT_UNIT
        )
    );
}

#[test]
fn venue_keywords() {
    assert_eq!(
        venue_name("Eastgate Market Place").as_deref(),
        Some("Eastgate Market Place")
    );
    assert_eq!(
        venue_name("Shop 9 Victoria Markets").as_deref(),
        Some("Victoria Markets")
    );
    assert_eq!(
        venue_name("Westfield Plaza").as_deref(),
        Some("Westfield Plaza")
    );
    assert_eq!(venue_name("Fairfield Rd"), None);
    assert_eq!(venue_name("12 Mallard St"), None);
}

#[test]
fn region_code_with_postcode() {
    assert_eq!(region_code("NSW 2150").as_deref(), Some("NSW"));
    assert_eq!(region_code("vic").as_deref(), Some("VIC"));
    assert_eq!(region_code(" WA ").as_deref(), Some("WA"));
    assert_eq!(region_code("New South Wales"), None);
    assert_eq!(region_code("NSW2150"), None);
}

#[test]
fn state_only_query_drops_postcode() {
    let p = plan("1 High St, Kew, VIC 3101");
    let last = p.last().unwrap();
    assert_eq!(last, &("VIC, Australia".to_owned(), 4, STATE_ONLY));
    assert!(p.contains(&("Kew, VIC 3101".to_owned(), 3, SUBURB_AND_STATE)));
}

#[test]
fn state_only_keeps_unrecognised_region_text() {
    let p = plan("Kew, Victoria");
    assert_eq!(
        p.last().unwrap(),
        &("Victoria, Australia".to_owned(), 4, STATE_ONLY)
    );
}

#[test]
fn plan_records_requested_locality() {
    assert_eq!(
        build_query_plan("1 High St, Kew, VIC", "Australia")
            .locality
            .as_deref(),
        Some("Kew")
    );
    assert_eq!(build_query_plan("Kew", "Australia").locality, None);
}

#[test]
fn blank_input_yields_empty_plan() {
    assert!(build_query_plan(" , ,", "Australia").candidates.is_empty());
}

use form_autofill::{
    dom::{Document, EventKind},
    form::{
        form_model::{EnrichedFieldValue, FormLocator},
        fulfill::{fulfill, fulfill_report, FieldOutcome},
        highlight::highlight_form,
        matcher::{locate_form, resolve_field, MatchStrategy},
        scanner::{scan_forms, ScanOptions},
    },
};

use crate::common::{by_id, by_label, by_name, find, fixture_page, page};

mod common;

// =========================================================================
// Form lookup
// =========================================================================

#[test]
fn form_is_located_by_id_attribute_then_position() {
    let doc = page(r#"<form id="login"></form><form></form><form id="0"></form>"#);
    let forms = doc.forms();

    assert_eq!(locate_form(&doc, &FormLocator::from_id("login")), Some(forms[0]));
    assert_eq!(locate_form(&doc, &FormLocator::from_id("1")), Some(forms[1]));
    assert_eq!(locate_form(&doc, &FormLocator::from_id("2")), Some(forms[2]));
    // An explicit id beats the positional reading of the same string
    assert_eq!(locate_form(&doc, &FormLocator::from_id("0")), Some(forms[2]));
    assert_eq!(locate_form(&doc, &FormLocator::from_id("7")), None);
    assert_eq!(locate_form(&doc, &FormLocator::from_id("")), None);
    assert_eq!(locate_form(&doc, &FormLocator::from_id("-1")), None);
}

#[test]
fn only_forms_answer_to_the_form_id() {
    let doc = page(r#"<div id="signup"></div><form></form>"#);

    assert_eq!(locate_form(&doc, &FormLocator::from_id("signup")), None);
}

#[test]
fn fingerprint_relocates_a_form_after_the_page_changed() {
    let before = page(r#"<form name="apply"><input name="email"></form>"#);
    let scanned = scan_forms(&before, ScanOptions::default()).forms()[0].clone();
    assert_eq!(scanned.id, "0");

    // A banner form was inserted above; position 0 now points elsewhere
    let mut after = page(
        r#"<form name="newsletter"><input name="email"></form>
           <form name="apply"><input name="email"></form>"#,
    );
    let target = after.forms()[1];

    let locator = FormLocator::from(&scanned);
    assert_eq!(locate_form(&after, &locator), Some(target));

    let report = fulfill_report(&mut after, &locator, &[by_name("email", "a@b.com")]);
    assert!(report.success());
    assert_eq!(after.value_writes().len(), 1);
    assert_eq!(after.parent_element(after.value_writes()[0].node), Some(target));

    // Without the fingerprint the stale position wins
    assert_eq!(
        locate_form(&after, &FormLocator::from_id("0")),
        Some(after.forms()[0])
    );
}

#[test]
fn identical_forms_are_told_apart_by_position() {
    let mut doc = page(
        r#"<section><form><input name="email"></form></section>
           <section><form><input name="email"></form></section>"#,
    );
    let outcome = scan_forms(&doc, ScanOptions::default());
    let second = outcome.forms()[1].clone();
    assert_eq!(second.id, "1");
    assert_eq!(second.fingerprint, outcome.forms()[0].fingerprint);

    let target = doc.forms()[1];
    let locator = FormLocator::from(&second);
    assert_eq!(locate_form(&doc, &locator), Some(target));

    let report = fulfill_report(&mut doc, &locator, &[by_name("email", "a@b.com")]);
    assert!(report.success());
    assert_eq!(doc.value_writes().len(), 1);
    assert_eq!(doc.parent_element(doc.value_writes()[0].node), Some(target));
}

#[test]
fn identical_forms_keep_a_unique_fingerprint_match_after_drift() {
    let before = page(
        r#"<form name="a"><input name="email"></form>
           <form name="b"><input name="email"></form>"#,
    );
    let scanned = scan_forms(&before, ScanOptions::default()).forms()[1].clone();

    // Two twins of form "a" now precede form "b"; the unique fingerprint wins
    let after = page(
        r#"<form name="a"><input name="email"></form>
           <form name="a"><input name="email"></form>
           <form name="b"><input name="email"></form>"#,
    );
    assert_eq!(
        locate_form(&after, &FormLocator::from(&scanned)),
        Some(after.forms()[2])
    );
}

#[test]
fn empty_form_id_never_means_the_first_form() {
    let doc = page(r#"<form><input name="a"></form>"#);

    assert_eq!(locate_form(&doc, &FormLocator::from_id("")), None);
    assert_eq!(locate_form(&doc, &FormLocator::from_id("  ")), None);
}

// =========================================================================
// Field resolution
// =========================================================================

#[test]
fn label_text_resolves_to_input_in_label_container() {
    let doc = page(
        r#"<form>
             <div><label>Phone number</label><input name="tel_1"></div>
             <div><label>Email</label><input name="mail_1"></div>
           </form>"#,
    );
    let form = doc.forms()[0];

    let found = resolve_field(&doc, form, &by_label("Email", "x")).unwrap().unwrap();
    assert_eq!(found.strategy, MatchStrategy::Label);
    assert_eq!(found.node, find(&doc, "[name=mail_1]"));

    // Substring match on the text node
    let found = resolve_field(&doc, form, &by_label("Phone", "x")).unwrap().unwrap();
    assert_eq!(found.node, find(&doc, "[name=tel_1]"));
}

#[test]
fn label_search_is_scoped_to_the_target_form() {
    let doc = page(
        r#"<form><div><label>Email</label><input name="first_form"></div></form>
           <form><div><label>Email</label><input name="second_form"></div></form>"#,
    );
    let second = doc.forms()[1];

    let found = resolve_field(&doc, second, &by_label("Email", "x")).unwrap().unwrap();
    assert_eq!(found.node, find(&doc, "[name=second_form]"));
}

#[test]
fn id_match_wins_regardless_of_label_and_name() {
    let doc = page(
        r#"<form>
             <div><label>Email</label><input name="email" id="primary"></div>
             <div><input name="backup" id="secondary"></div>
           </form>"#,
    );
    let form = doc.forms()[0];
    let field = EnrichedFieldValue {
        label: "Email".into(),
        name: "email".into(),
        id: "secondary".into(),
        associated_value: "v".into(),
        ..Default::default()
    };

    let found = resolve_field(&doc, form, &field).unwrap().unwrap();
    assert_eq!(found.strategy, MatchStrategy::Id);
    assert_eq!(found.node, find(&doc, "#secondary"));
}

#[test]
fn name_match_overrides_a_label_match() {
    // Later strategies win over the label even when the label pointed at the
    // intended element. Kept as observed behavior.
    let doc = page(
        r#"<form>
             <div><label>Work email</label><input name="work"></div>
             <div><label>Home email</label><input name="home"></div>
           </form>"#,
    );
    let form = doc.forms()[0];
    let field = EnrichedFieldValue {
        label: "Work email".into(),
        name: "home".into(),
        associated_value: "v".into(),
        ..Default::default()
    };

    let found = resolve_field(&doc, form, &field).unwrap().unwrap();
    assert_eq!(found.strategy, MatchStrategy::Name);
    assert_eq!(found.node, find(&doc, "[name=home]"));
}

#[test]
fn failed_later_strategies_keep_the_label_match() {
    let doc = page(r#"<form><div><label>City</label><input name="c1"></div></form>"#);
    let form = doc.forms()[0];
    let field = EnrichedFieldValue {
        label: "City".into(),
        id: "missing".into(),
        name: "also_missing".into(),
        ..Default::default()
    };

    let found = resolve_field(&doc, form, &field).unwrap().unwrap();
    assert_eq!(found.strategy, MatchStrategy::Label);
}

#[test]
fn nothing_matching_is_unresolved_not_an_error() {
    let doc = page(r#"<form><input name="a"></form>"#);
    let form = doc.forms()[0];

    assert_eq!(resolve_field(&doc, form, &by_name("zzz", "v")).unwrap(), None);
    assert_eq!(resolve_field(&doc, form, &EnrichedFieldValue::default()).unwrap(), None);
}

#[test]
fn fields_outside_the_form_are_not_matched() {
    let doc = page(r#"<form><input name="in"></form><input name="out" id="out">"#);
    let form = doc.forms()[0];

    assert_eq!(resolve_field(&doc, form, &by_name("out", "v")).unwrap(), None);
    assert_eq!(resolve_field(&doc, form, &by_id("out", "v")).unwrap(), None);
}

#[test]
fn unsanitizable_id_is_a_matching_error() {
    let doc = page(r#"<form><input id="123" name="n"></form>"#);
    let form = doc.forms()[0];

    assert!(resolve_field(&doc, form, &by_id("123", "v")).is_err());
}

// =========================================================================
// Fulfillment
// =========================================================================

#[test]
fn scenario_a_label_scan_then_fill_by_name() {
    let mut doc = page(r#"<form><label>Email</label><input name="email"></form>"#);

    let outcome = scan_forms(&doc, ScanOptions::default());
    let form = &outcome.forms()[0];
    assert_eq!(form.fields[0].label.as_deref(), Some("Email"));

    let ok = fulfill(
        &mut doc,
        &FormLocator::from_id(&form.id),
        &[by_name("email", "a@b.com")],
    );
    assert!(ok);

    let input = find(&doc, "input");
    assert_eq!(doc.value(input), "a@b.com");

    let kinds: Vec<EventKind> = doc
        .events()
        .iter()
        .filter(|e| e.target == input)
        .map(|e| e.event.kind)
        .collect();
    assert_eq!(kinds, vec![EventKind::Input, EventKind::Change]);
    assert!(doc.events().iter().all(|e| e.event.bubbles));
}

#[test]
fn scenario_b_id_with_reserved_character() {
    let mut doc = page(r#"<form><input id="user;name"></form>"#);

    let report = fulfill_report(&mut doc, &FormLocator::from_id("0"), &[by_id("user;name", "ada")]);

    assert!(report.success());
    assert_eq!(
        report.fields[0].outcome,
        FieldOutcome::Applied {
            node: find(&doc, "input"),
            strategy: MatchStrategy::Id
        }
    );
    assert_eq!(doc.value(find(&doc, "input")), "ada");
}

#[test]
fn scenario_d_missing_form_returns_false_without_mutation() {
    let mut doc = page(r#"<form id="only"><input name="email" value="keep"></form>"#);
    let before = doc.to_html();

    let ok = fulfill(&mut doc, &FormLocator::from_id("3"), &[by_name("email", "x")]);

    assert!(!ok);
    assert!(doc.value_writes().is_empty());
    assert!(doc.events().is_empty());
    assert_eq!(doc.to_html(), before);
}

#[test]
fn scenario_e_winning_match_writes_last() {
    let mut doc = page(
        r#"<form>
             <div><label>Email</label><input name="email_label"></div>
             <div><input id="email" name="email_id"></div>
           </form>"#,
    );
    let label_target = find(&doc, "[name=email_label]");
    let id_target = find(&doc, "#email");
    let fields = vec![
        by_label("Email", "from-label"),
        EnrichedFieldValue {
            label: "Email".into(),
            id: "email".into(),
            associated_value: "from-id".into(),
            ..Default::default()
        },
    ];

    let report = fulfill_report(&mut doc, &FormLocator::from_id("0"), &fields);

    assert!(report.success());
    assert_eq!(doc.value(label_target), "from-label");
    assert_eq!(doc.value(id_target), "from-id");
    assert_eq!(
        report.fields[1].outcome,
        FieldOutcome::Applied {
            node: id_target,
            strategy: MatchStrategy::Id
        }
    );
}

#[test]
fn repeated_entries_for_one_element_keep_the_last_value() {
    let mut doc = page(r#"<form><div><label>Email</label><input id="email"></div></form>"#);
    let input = find(&doc, "input");

    fulfill(
        &mut doc,
        &FormLocator::from_id("0"),
        &[by_label("Email", "first"), by_id("email", "second")],
    );

    assert_eq!(doc.value(input), "second");
    assert_eq!(doc.value_writes().len(), 2);
    assert_eq!(doc.events_reaching(input).len(), 4);
}

#[test]
fn unresolved_fields_are_skipped_and_pass_still_succeeds() {
    let mut doc = page(r#"<form><input name="a"></form>"#);

    let report = fulfill_report(
        &mut doc,
        &FormLocator::from_id("0"),
        &[by_name("missing", "x"), by_name("a", "y")],
    );

    assert!(report.success());
    assert_eq!(report.unresolved_count(), 1);
    assert_eq!(report.applied_count(), 1);
    assert_eq!(report.fields[0].outcome, FieldOutcome::Unresolved);
    assert_eq!(doc.value(find(&doc, "input")), "y");
}

#[test]
fn form_found_with_no_matches_is_still_success() {
    let mut doc = page(r#"<form><input name="a"></form>"#);

    assert!(fulfill(&mut doc, &FormLocator::from_id("0"), &[by_name("zzz", "x")]));
    assert!(fulfill(&mut doc, &FormLocator::from_id("0"), &[]));
    assert!(doc.value_writes().is_empty());
}

#[test]
fn empty_value_is_still_written() {
    let mut doc = page(r#"<form><input name="a" value="old"></form>"#);

    fulfill(&mut doc, &FormLocator::from_id("0"), &[by_name("a", "")]);

    assert_eq!(doc.value(find(&doc, "input")), "");
    assert_eq!(doc.events().len(), 2);
}

#[test]
fn matching_error_aborts_remaining_fields_and_degrades_to_false() {
    let mut doc = page(r#"<form><input name="a"><input id="9lives"><input name="b"></form>"#);

    let report = fulfill_report(
        &mut doc,
        &FormLocator::from_id("0"),
        &[by_name("a", "1"), by_id("9lives", "2"), by_name("b", "3")],
    );

    assert!(!report.success());
    assert!(report.form_found());
    assert!(report.error.is_some());
    // Writes made before the error stay
    assert_eq!(doc.value(find(&doc, "[name=a]")), "1");
    assert_eq!(doc.value(find(&doc, "[name=b]")), "");
    assert_eq!(report.fields.len(), 1);
}

#[test]
fn fulfill_fixture_form() {
    let mut doc = fixture_page("job_application.html");
    let fields = vec![
        by_label("First", "Ada"),
        by_name("last_name", "Lovelace"),
        by_label("Email", "ada@example.com"),
        by_name("cover_letter", "Hello"),
    ];

    let report = fulfill_report(&mut doc, &FormLocator::from_id("apply"), &fields);

    assert!(report.success());
    assert_eq!(report.applied_count(), 4);
    assert_eq!(doc.value(find(&doc, "#fname")), "Ada");
    assert_eq!(doc.value(find(&doc, "#lname")), "Lovelace");
    assert_eq!(doc.value(find(&doc, "[name=email]")), "ada@example.com");
    assert_eq!(doc.value(find(&doc, "textarea")), "Hello");
    // The search form is untouched
    assert_eq!(doc.value(find(&doc, "[name=q]")), "");

    let html = doc.to_html();
    assert!(html.contains("value=\"Ada\""));
    assert!(html.contains(">Hello</textarea>"));
}

#[test]
fn fill_report_serializes_outcomes() {
    let mut doc = page(r#"<form><input name="a"></form>"#);
    let report = fulfill_report(
        &mut doc,
        &FormLocator::from_id("0"),
        &[by_name("a", "x"), by_name("b", "y")],
    );

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["form_id"], "0");
    assert_eq!(json["fields"][0]["outcome"], "applied");
    assert_eq!(json["fields"][0]["strategy"], "name");
    assert_eq!(json["fields"][0]["key"], "a");
    assert_eq!(json["fields"][1]["outcome"], "unresolved");
}

// =========================================================================
// Highlight
// =========================================================================

#[test]
fn highlight_clears_borders_and_scrolls_target() {
    let mut doc = page(
        r#"<form id="a" style="border: 3px solid red"></form>
           <form id="b" style="border: 1px dashed blue; margin: 4px"></form>"#,
    );
    let forms = doc.forms();

    let target = highlight_form(&mut doc, &FormLocator::from_id("b"));

    assert_eq!(target, Some(forms[1]));
    assert_eq!(doc.style(forms[0], "border"), None);
    assert_eq!(doc.style(forms[1], "border"), None);
    assert_eq!(doc.style(forms[1], "margin"), Some("4px"));
    assert_eq!(doc.scroll_requests().len(), 1);
    assert_eq!(doc.scroll_requests()[0].node, forms[1]);
}

#[test]
fn highlight_of_missing_form_is_silent() {
    let mut doc = page(r#"<form style="border: 1px solid red"></form>"#);
    let form = doc.forms()[0];

    let target = highlight_form(&mut doc, &FormLocator::from_id("nope"));

    assert_eq!(target, None);
    assert!(doc.scroll_requests().is_empty());
    assert_eq!(doc.style(form, "border"), None);
}

//! JSON and CSV rendering of aggregated results.
//!
//! Renderers are pure: they read results and limits and never modify
//! stored data.

use crate::models::{Count, CountryResult, Limits};
use serde_json::{json, Map, Value};

/// Generate a JSON document with one top-level key per country.
pub fn generate_json_report<'a, I>(results: I, limits: Limits) -> String
where
    I: IntoIterator<Item = (&'a str, &'a CountryResult)>,
{
    let document: Map<String, Value> = results
        .into_iter()
        .map(|(id, result)| (id.to_string(), country_json(result, limits)))
        .collect();

    Value::Object(document).to_string()
}

/// Build the `{total, states, categories}` object for one country.
fn country_json(result: &CountryResult, limits: Limits) -> Value {
    json!({
        "total": result.total,
        "states": counts_object(result.limited_states(limits.max_states)),
        "categories": counts_object(result.limited_categories(limits.max_categories)),
    })
}

fn counts_object<'a>(counts: impl Iterator<Item = (&'a String, &'a Count)>) -> Value {
    Value::Object(
        counts
            .map(|(name, count)| (name.clone(), Value::from(*count)))
            .collect(),
    )
}

/// JSON payload for a country without results.
pub fn json_not_found(id: &str) -> String {
    json!({ "error": not_found_message(id) }).to_string()
}

/// Generate CSV blocks (label line + value line) per country, separated
/// by blank lines.
pub fn generate_csv_report<'a, I>(results: I, limits: Limits) -> String
where
    I: IntoIterator<Item = (&'a str, &'a CountryResult)>,
{
    results
        .into_iter()
        .map(|(id, result)| country_csv(id, result, limits))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the two-line CSV block for one country.
fn country_csv(id: &str, result: &CountryResult, limits: Limits) -> String {
    let mut labels = vec![quote(&format!("{}_total", id))];
    let mut values = vec![result.total_text()];

    for (name, count) in result.limited_states(limits.max_states) {
        labels.push(quote(&format!("{}_state_{}", id, name)));
        values.push(count.to_string());
    }

    for (name, count) in result.limited_categories(limits.max_categories) {
        labels.push(quote(&format!("{}_category_{}", id, name)));
        values.push(count.to_string());
    }

    format!("{}\n{}", labels.join(","), values.join(","))
}

/// CSV payload for a country without results. The id is emitted verbatim.
pub fn csv_not_found(id: &str) -> String {
    format!("\"{}\"", not_found_message(id))
}

fn not_found_message(id: &str) -> String {
    format!("no data for country {}", id)
}

/// Quote a CSV field, doubling embedded quotes.
fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_result() -> CountryResult {
        let mut result = CountryResult::empty();
        result.total = Value::from(120);
        result.states.insert("Lagos".to_string(), 80);
        result.states.insert("Abuja".to_string(), 40);
        result.categories.insert("Electronics".to_string(), 100);
        result.categories.insert("Vehicles".to_string(), 20);
        result
    }

    #[test]
    fn test_generate_json_report_limited() {
        let result = create_test_result();
        let json = generate_json_report([("NG", &result)], Limits::new(1, 1));
        assert_eq!(
            json,
            r#"{"NG":{"total":120,"states":{"Lagos":80},"categories":{"Electronics":100}}}"#
        );
    }

    #[test]
    fn test_generate_json_report_keeps_discovery_order() {
        let mut result = CountryResult::empty();
        result.states.insert("Zamfara".to_string(), 1);
        result.states.insert("Abia".to_string(), 2);

        let json = generate_json_report([("NG", &result)], Limits::unlimited());
        assert!(json.contains(r#""states":{"Zamfara":1,"Abia":2}"#));
    }

    #[test]
    fn test_generate_json_report_empty() {
        let json = generate_json_report(std::iter::empty(), Limits::unlimited());
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_json_not_found_escapes_id() {
        assert_eq!(json_not_found("UG"), r#"{"error":"no data for country UG"}"#);
        assert_eq!(
            json_not_found(r#"U"G"#),
            r#"{"error":"no data for country U\"G"}"#
        );
    }

    #[test]
    fn test_generate_csv_report_full() {
        let result = create_test_result();
        let csv = generate_csv_report([("NG", &result)], Limits::unlimited());
        assert_eq!(
            csv,
            "\"NG_total\",\"NG_state_Lagos\",\"NG_state_Abuja\",\"NG_category_Electronics\",\"NG_category_Vehicles\"\n120,80,40,100,20"
        );
    }

    #[test]
    fn test_generate_csv_report_limits_are_independent() {
        let result = create_test_result();
        let csv = generate_csv_report([("NG", &result)], Limits::new(0, 1));
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "120,80,40,100");
        assert!(!lines[0].contains("Vehicles"));
    }

    #[test]
    fn test_generate_csv_report_multiple() {
        let result = create_test_result();
        let empty = CountryResult::empty();
        let csv = generate_csv_report([("NG", &result), ("UG", &empty)], Limits::new(1, 0));
        let blocks: Vec<_> = csv.split("\n\n").collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1], "\"UG_total\"\n0");
    }

    #[test]
    fn test_csv_not_found() {
        assert_eq!(csv_not_found("BB"), "\"no data for country BB\"");
        assert_eq!(csv_not_found(r#"B"B"#), r#""no data for country B"B""#);
    }

    #[test]
    fn test_total_emitted_as_reported() {
        let mut result = CountryResult::empty();
        result.total = Value::from(u64::MAX);
        result.states.insert("Lagos".to_string(), 80);

        assert_eq!(
            generate_json_report([("NG", &result)], Limits::unlimited()),
            r#"{"NG":{"total":18446744073709551615,"states":{"Lagos":80},"categories":{}}}"#
        );
        assert_eq!(
            generate_csv_report([("NG", &result)], Limits::unlimited()),
            "\"NG_total\",\"NG_state_Lagos\"\n18446744073709551615,80"
        );

        result.total = Value::from("120");
        assert!(generate_json_report([("NG", &result)], Limits::unlimited())
            .contains(r#""total":"120""#));
        assert!(generate_csv_report([("NG", &result)], Limits::unlimited()).ends_with("\n120,80"));
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("Lagos"), "\"Lagos\"");
        assert_eq!(quote(r#"6" Pipes"#), r#""6"" Pipes""#);
    }
}

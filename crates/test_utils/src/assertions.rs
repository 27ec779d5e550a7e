//! Custom Test Assertions
//!
//! Assertion helpers for dispatch reports and rendered XML that give more
//! meaningful failure messages than bare `assert!`.

use domain_milestone::{ConfigOutcome, DispatchReport};

/// Text values of every `<tag>` element in `xml`, in document order
pub fn xml_values(xml: &str, tag: &str) -> Vec<String> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let mut values = Vec::new();
    let mut rest = xml;
    while let Some(start) = rest.find(&open) {
        let after = &rest[start + open.len()..];
        let Some(end) = after.find(&close) else {
            break;
        };
        values.push(after[..end].to_string());
        rest = &after[end + close.len()..];
    }
    values
}

/// Asserts `xml` has exactly `expected` `<tag>` elements
pub fn assert_xml_count(xml: &str, tag: &str, expected: usize) {
    let actual = xml_values(xml, tag).len();
    assert_eq!(
        actual, expected,
        "Expected {} <{}> elements, found {}\n{}",
        expected, tag, actual, xml
    );
}

/// Asserts `xml` contains `<tag>value</tag>`
pub fn assert_xml_value(xml: &str, tag: &str, value: &str) {
    let values = xml_values(xml, tag);
    assert!(
        values.iter().any(|v| v == value),
        "Expected <{}>{}</{}>, found {:?}",
        tag,
        value,
        tag,
        values
    );
}

/// Asserts `xml` has no `<tag>` element at all
pub fn assert_xml_absent(xml: &str, tag: &str) {
    assert!(
        !xml.contains(&format!("<{}", tag)),
        "Expected no <{}> element\n{}",
        tag,
        xml
    );
}

/// Asserts the report counts `expected` sent documents
pub fn assert_documents_sent(report: &DispatchReport, expected: usize) {
    assert_eq!(
        report.documents_sent(),
        expected,
        "Expected {} documents sent, report was {:?}",
        expected,
        report.configs
    );
}

/// Asserts the configuration for `partner_key` ended with `expected`
pub fn assert_outcome(report: &DispatchReport, partner_key: &str, expected: &ConfigOutcome) {
    let config = report
        .configs
        .iter()
        .find(|c| c.partner_key == partner_key)
        .unwrap_or_else(|| panic!("No configuration for partner {} in {:?}", partner_key, report.configs));
    assert_eq!(&config.outcome, expected, "Unexpected outcome for partner {}", partner_key);
}

/// Asserts the configuration for `partner_key` failed
pub fn assert_failed(report: &DispatchReport, partner_key: &str) {
    let config = report
        .configs
        .iter()
        .find(|c| c.partner_key == partner_key)
        .unwrap_or_else(|| panic!("No configuration for partner {} in {:?}", partner_key, report.configs));
    assert!(
        matches!(config.outcome, ConfigOutcome::Failed { .. }),
        "Expected partner {} to fail, outcome was {:?}",
        partner_key,
        config.outcome
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = "<Batch>\n  <Document>\n    <MasterBill>A</MasterBill>\n    <MasterBill>B</MasterBill>\n  </Document>\n</Batch>";

    #[test]
    fn test_xml_values_in_order() {
        assert_eq!(xml_values(XML, "MasterBill"), vec!["A", "B"]);
        assert!(xml_values(XML, "Container").is_empty());
    }

    #[test]
    fn test_xml_assertions() {
        assert_xml_count(XML, "MasterBill", 2);
        assert_xml_value(XML, "MasterBill", "B");
        assert_xml_absent(XML, "Containers");
    }

    #[test]
    #[should_panic(expected = "Expected 3 <MasterBill> elements")]
    fn test_count_mismatch_panics() {
        assert_xml_count(XML, "MasterBill", 3);
    }
}

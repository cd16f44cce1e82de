//! Message templates with `{Column}` placeholders.
//!
//! Substitution is literal: a placeholder is replaced only when its column was
//! selected by the user and exists in the spreadsheet. Anything else, including
//! typos, stays in the text exactly as written.

use crate::sheet::Row;
use regex::Regex;
use std::sync::OnceLock;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^{}\r\n]+)\}").expect("placeholder regex is valid"))
}

/// Column names referenced as `{Name}` in `text`, in order of first appearance.
pub fn placeholders(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for caps in placeholder_re().captures_iter(text) {
        let name = &caps[1];
        if !found.iter().any(|f| f == name) {
            found.push(name.to_string());
        }
    }
    found
}

/// Placeholders in `text` that name none of `headers`.
pub fn unknown_placeholders(text: &str, headers: &[String]) -> Vec<String> {
    placeholders(text)
        .into_iter()
        .filter(|p| !headers.contains(p))
        .collect()
}

/// The parts of a send configuration the renderer needs.
#[derive(Debug, Clone, Copy)]
pub struct MessageTemplate<'a> {
    pub text: &'a str,
    pub selected_vars: &'a [String],
    pub headers: &'a [String],
    pub phone_column: &'a str,
}

impl<'a> MessageTemplate<'a> {
    /// Renders the message for one contact.
    ///
    /// Selected columns (other than the phone column) are substituted with the
    /// row value, blank cells becoming empty text. The phone column placeholder
    /// is always substituted with `raw_phone`, the cell as it was before
    /// normalization, whether or not it was selected. Cells are read trimmed,
    /// so surrounding whitespace of the phone cell is not reproduced.
    pub fn render(&self, row: &Row, raw_phone: &str) -> String {
        let mut message = self.text.to_string();
        for var in self.selected_vars {
            if var == self.phone_column || !self.headers.contains(var) {
                continue;
            }
            let value = row.get(var).unwrap_or("");
            message = message.replace(&format!("{{{}}}", var), value);
        }
        message.replace(&format!("{{{}}}", self.phone_column), raw_phone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn unselected_placeholder_is_left_alone() {
        let headers = strings(&["Name", "Amount", "Phone"]);
        let selected = strings(&["Name"]);
        let template = MessageTemplate {
            text: "Hello {Name}, bill {Amount}",
            selected_vars: &selected,
            headers: &headers,
            phone_column: "Phone",
        };
        let row = Row::from_pairs(1, [("Name", "Ali"), ("Amount", "500")]);
        assert_eq!(template.render(&row, "0300"), "Hello Ali, bill {Amount}");
    }

    #[test]
    fn phone_placeholder_is_always_substituted_with_raw_value() {
        let headers = strings(&["Name", "Phone"]);
        let selected = strings(&["Name"]);
        let template = MessageTemplate {
            text: "Hi {Name}, we have {Phone} on file",
            selected_vars: &selected,
            headers: &headers,
            phone_column: "Phone",
        };
        let row = Row::from_pairs(1, [("Name", "Ali"), ("Phone", "0300-1234567")]);
        assert_eq!(
            template.render(&row, "0300-1234567"),
            "Hi Ali, we have 0300-1234567 on file"
        );
    }

    #[test]
    fn blank_selected_cell_renders_empty() {
        let headers = strings(&["Name", "City", "Phone"]);
        let selected = strings(&["Name", "City"]);
        let template = MessageTemplate {
            text: "{Name} from {City}.",
            selected_vars: &selected,
            headers: &headers,
            phone_column: "Phone",
        };
        let row = Row::from_pairs(1, [("Name", "Sara"), ("City", " ")]);
        assert_eq!(template.render(&row, "123"), "Sara from .");
    }

    #[test]
    fn selected_var_missing_from_headers_is_ignored() {
        let headers = strings(&["Name", "Phone"]);
        let selected = strings(&["Name", "Nickname"]);
        let template = MessageTemplate {
            text: "{Nickname} / {Name}",
            selected_vars: &selected,
            headers: &headers,
            phone_column: "Phone",
        };
        let row = Row::from_pairs(1, [("Name", "Ali")]);
        assert_eq!(template.render(&row, "1"), "{Nickname} / Ali");
    }

    #[test]
    fn repeated_placeholders_and_lines_are_all_replaced() {
        let headers = strings(&["Name", "Phone"]);
        let selected = strings(&["Name"]);
        let template = MessageTemplate {
            text: "Hello {Name},\nThanks {Name}!",
            selected_vars: &selected,
            headers: &headers,
            phone_column: "Phone",
        };
        let row = Row::from_pairs(1, [("Name", "Ali")]);
        assert_eq!(template.render(&row, "1"), "Hello Ali,\nThanks Ali!");
    }

    #[test]
    fn placeholder_scan_dedupes_in_order() {
        assert_eq!(
            placeholders("{Name} {Amount} {Name} {}"),
            vec!["Name".to_string(), "Amount".to_string()]
        );
    }

    #[test]
    fn unknown_placeholders_against_headers() {
        let headers = strings(&["Name", "Phone"]);
        assert_eq!(
            unknown_placeholders("Hi {Name}, bill {Amount}", &headers),
            vec!["Amount".to_string()]
        );
    }
}

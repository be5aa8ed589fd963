//! Roll Call report form markup.
//!
//! The form belongs to the vendor; when its field names change, this is the
//! only place that needs to follow.

/// `name` attributes of the report request form controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormLocators {
    pub start_date: &'static str,
    pub end_date: &'static str,
    pub email: &'static str,
    pub submit: &'static str,
}

impl FormLocators {
    pub const ROLL_CALL: FormLocators = FormLocators {
        start_date: "report[start_date]",
        end_date: "report[end_date]",
        email: "report[email]",
        submit: "commit",
    };
}

impl Default for FormLocators {
    fn default() -> Self {
        Self::ROLL_CALL
    }
}

/// CSS selector matching a control by its `name` attribute.
pub fn by_name(name: &str) -> String {
    format!("[name=\"{}\"]", name.replace('"', "\\\""))
}

use std::collections::BTreeMap;

/// Allowed report names. The option set is fixed; anything the server sends
/// for `report_name` beyond the field name itself is ignored.
pub const REPORT_NAMES: [&str; 3] = ["Packslip", "CommercialInvoice", "SLI"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text { value: String, cursor: usize },
    Select { options: Vec<String>, selected: usize },
}

#[derive(Debug, Clone)]
pub struct ParamField {
    pub name: String,
    pub label: String,
    pub required: bool,
    pub kind: FieldKind,
}

impl ParamField {
    fn text(name: &str, label: &str, required: bool) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            required,
            kind: FieldKind::Text {
                value: String::new(),
                cursor: 0,
            },
        }
    }

    fn select(name: &str, label: &str, options: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            required: true,
            kind: FieldKind::Select {
                options: options.iter().map(|o| o.to_string()).collect(),
                selected: 0,
            },
        }
    }

    /// Current value as it would be submitted (untrimmed).
    pub fn value(&self) -> &str {
        match &self.kind {
            FieldKind::Text { value, .. } => value,
            FieldKind::Select { options, selected } => {
                options.get(*selected).map(|s| s.as_str()).unwrap_or("")
            }
        }
    }
}

/// Build the full field set for a server parameter request. Order follows
/// the input sequences; duplicates are kept as-is.
pub fn build_fields(required: &[String], optional: &[String]) -> Vec<ParamField> {
    let mut fields = Vec::with_capacity(required.len() + optional.len());

    for name in required {
        let field = match name.as_str() {
            "report_name" => ParamField::select("report_name", "Report Name", &REPORT_NAMES),
            "item" => ParamField::text("item", "Item Number", true),
            "model_item" => ParamField::text("model_item", "Model Number", true),
            other => ParamField::text(other, other, true),
        };
        fields.push(field);
    }

    for name in optional {
        let label = match name.as_str() {
            "country_query" => "Country (optional)".to_string(),
            other => format!("{} (optional)", other),
        };
        fields.push(ParamField::text(name, &label, false));
    }

    fields
}

/// The parameter form: a flat field list rebuilt from scratch on every
/// server request, visible only between an `ask_params` response and the
/// next final reply.
#[derive(Debug, Default)]
pub struct FormState {
    pub visible: bool,
    pub fields: Vec<ParamField>,
    pub focus: usize,
}

impl FormState {
    /// Discard whatever is showing and rebuild from the new field lists.
    pub fn show(&mut self, required: &[String], optional: &[String]) {
        self.fields = build_fields(required, optional);
        self.focus = 0;
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.fields.clear();
        self.focus = 0;
        self.visible = false;
    }

    pub fn focused_field_mut(&mut self) -> Option<&mut ParamField> {
        let focus = self.focus;
        self.fields.get_mut(focus)
    }

    pub fn focus_next(&mut self) {
        let len = self.fields.len();
        if len > 0 {
            self.focus = (self.focus + 1) % len;
        }
    }

    pub fn focus_prev(&mut self) {
        let len = self.fields.len();
        if len > 0 {
            self.focus = (self.focus + len - 1) % len;
        }
    }

    /// First required field whose trimmed value is empty, if any. Selects
    /// always hold a value, so only text fields can block submission.
    pub fn missing_required(&self) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.required && f.value().trim().is_empty())
            .map(|f| f.label.as_str())
    }

    /// Collect every current field by name into a flat submission map,
    /// trimming each value. Duplicate names collapse to the last value.
    pub fn collect(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        for field in &self.fields {
            params.insert(field.name.clone(), field.value().trim().to_string());
        }
        params
    }
}

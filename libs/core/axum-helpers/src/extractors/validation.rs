use crate::errors::FieldErrors;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// Flatten validator errors into `field -> messages`.
///
/// Nested structs are keyed `parent.child` and list items `parent.0.child`.
/// Rules without a custom message fall back to `"{field} is invalid ({code})"`.
pub fn flatten_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut fields = FieldErrors::new();
    collect(errors, None, &mut fields);
    fields
}

fn collect(errors: &ValidationErrors, prefix: Option<&str>, fields: &mut FieldErrors) {
    for (field, kind) in errors.errors() {
        let key = match prefix {
            Some(prefix) => format!("{prefix}.{field}"),
            None => field.to_string(),
        };

        match kind {
            ValidationErrorsKind::Field(violations) => {
                let messages = fields.entry(key.clone()).or_default();
                messages.extend(violations.iter().map(|v| message_for(&key, v)));
            }
            ValidationErrorsKind::Struct(nested) => collect(nested, Some(&key), fields),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect(nested, Some(&format!("{key}.{index}")), fields);
                }
            }
        }
    }
}

fn message_for(field: &str, violation: &ValidationError) -> String {
    violation
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| format!("{field} is invalid ({})", violation.code))
}

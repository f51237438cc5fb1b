//! Renders a [`FormSchema`] as an HTML form.

use maud::{html, Markup};

use crate::forms::{FieldErrors, FieldKind, FieldSpec, FormSchema, RawForm};

/// Submit button label while idle and while the request is in flight
pub struct SubmitLabels {
    pub idle: &'static str,
    pub busy: &'static str,
}

pub fn render_form(
    schema: &FormSchema,
    action: &str,
    values: &RawForm,
    errors: &FieldErrors,
    submit: &SubmitLabels,
) -> Markup {
    html! {
        form class={"form form-" (schema.name)} method="post" action=(action)
            hx-disabled-elt="find button[type='submit']" {
            @if let Some(message) = errors.get("form") {
                p class="field-error" { (message) }
            }
            @for spec in schema.fields {
                (field(spec, values, errors))
            }
            div class="form-actions" {
                button class="button button-primary" type="submit" {
                    span class="when-idle" { (submit.idle) }
                    span class="when-busy" { (submit.busy) }
                }
            }
        }
    }
}

fn field(spec: &FieldSpec, values: &RawForm, errors: &FieldErrors) -> Markup {
    let error = errors.get(spec.name);
    let id = format!("field-{}", spec.name);
    let class = if error.is_some() {
        "field field-invalid"
    } else {
        "field"
    };

    html! {
        div class=(class) {
            @match spec.kind {
                FieldKind::Radio(options) => {
                    fieldset {
                        legend { (label_text(spec)) }
                        @for (wire, text) in options {
                            label class="choice" {
                                input type="radio" name=(spec.name) value=(wire)
                                    checked[values.value(spec.name) == Some(*wire)]
                                    required[spec.required];
                                " " (text)
                            }
                        }
                    }
                }
                FieldKind::Checkboxes { options, .. } => {
                    fieldset {
                        legend { (label_text(spec)) }
                        @for (wire, text) in options {
                            label class="choice" {
                                input type="checkbox" name=(spec.name) value=(wire)
                                    checked[values.contains(spec.name, wire)];
                                " " (text)
                            }
                        }
                    }
                }
                FieldKind::Select(options) => {
                    label for=(id) { (label_text(spec)) }
                    select id=(id) name=(spec.name) required[spec.required] {
                        option value="" { "Select…" }
                        @for (wire, text) in options {
                            option value=(wire) selected[values.value(spec.name) == Some(*wire)] {
                                (text)
                            }
                        }
                    }
                }
                FieldKind::LongText => {
                    label for=(id) { (label_text(spec)) }
                    textarea id=(id) name=(spec.name) rows="4" required[spec.required] {
                        (values.value(spec.name).unwrap_or_default())
                    }
                }
                FieldKind::Password { .. } => {
                    label for=(id) { (label_text(spec)) }
                    input id=(id) type="password" name=(spec.name) autocomplete="current-password"
                        required[spec.required];
                }
                kind => {
                    label for=(id) { (label_text(spec)) }
                    input id=(id) type=(input_type(kind)) name=(spec.name)
                        value=[values.value(spec.name)]
                        min=[matches!(kind, FieldKind::Count).then_some("1")]
                        required[spec.required];
                }
            }
            @if let Some(message) = error {
                p class="field-error" { (message) }
            }
        }
    }
}

fn label_text(spec: &FieldSpec) -> String {
    if spec.required {
        format!("{} *", spec.label)
    } else {
        spec.label.to_string()
    }
}

fn input_type(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Email => "email",
        FieldKind::Phone => "tel",
        FieldKind::Count => "number",
        FieldKind::Date => "date",
        FieldKind::DateTime => "datetime-local",
        _ => "text",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::emergency;

    const LABELS: SubmitLabels = SubmitLabels {
        idle: "Send",
        busy: "Sending…",
    };

    #[test]
    fn test_renders_every_field() {
        let html = render_form(
            &emergency::SCHEMA,
            "/emergency",
            &RawForm::new(),
            &FieldErrors::default(),
            &LABELS,
        )
        .into_string();

        for spec in emergency::SCHEMA.fields {
            assert!(html.contains(&format!("name=\"{}\"", spec.name)), "{}", spec.name);
        }
        assert!(html.contains("type=\"datetime-local\""));
        assert!(html.contains("hx-disabled-elt"));
        assert!(html.contains("Full Name *"));
        assert!(html.contains(">Expected Duration<"));
    }

    #[test]
    fn test_values_and_errors_are_kept() {
        let mut values = RawForm::new();
        values.set("name", "D");
        values.set("urgency", "same-day");
        let errors = emergency::validate(&values).unwrap_err();

        let html = render_form(&emergency::SCHEMA, "/emergency", &values, &errors, &LABELS)
            .into_string();
        assert!(html.contains("value=\"D\""));
        assert!(html.contains("value=\"same-day\" checked"));
        assert!(html.contains("Name must be at least 2 characters"));
        assert!(html.contains("field-invalid"));
    }
}

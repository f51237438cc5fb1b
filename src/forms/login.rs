use super::{FieldErrors, FieldKind, FieldReader, FieldSpec, FormSchema, RawForm};
use crate::models::LoginRequest;

pub static SCHEMA: FormSchema = FormSchema {
    name: "login",
    fields: &[
        FieldSpec::required("email", "Email", FieldKind::Email, "Invalid email"),
        FieldSpec::required(
            "password",
            "Password",
            FieldKind::Password { min_len: 6 },
            "Password must be at least 6 characters",
        ),
    ],
};

pub fn validate(raw: &RawForm) -> Result<LoginRequest, FieldErrors> {
    let read = FieldReader::check(&SCHEMA, raw);
    let request = LoginRequest {
        email: read.text("email"),
        password: read.secret("password"),
    };
    read.finish(Some(request))
}

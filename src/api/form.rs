//! Form submissions, accepted as JSON or url-encoded bodies

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use axum_extra::extract::Form;
use serde::de::DeserializeOwned;

use crate::{
    error::AppError,
    models::{author::AuthorForm, book::BookForm, instance::RenewalForm},
};

/// Fields of a submitted form, each with the message shown when its value
/// cannot be parsed
pub trait FormFields {
    const FIELDS: &'static [(&'static str, &'static str)];
}

impl FormFields for RenewalForm {
    const FIELDS: &'static [(&'static str, &'static str)] = &[("renewal_date", "Enter a valid date.")];
}

impl FormFields for BookForm {
    const FIELDS: &'static [(&'static str, &'static str)] = &[
        ("title", "Enter a valid title."),
        ("author_id", "Select a valid choice."),
        ("summary", "Enter a valid summary."),
        ("isbn", "Enter a valid ISBN."),
        ("genre_ids", "Select a valid choice."),
        ("language", "Enter a valid language."),
    ];
}

impl FormFields for AuthorForm {
    const FIELDS: &'static [(&'static str, &'static str)] = &[
        ("first_name", "Enter a valid first name."),
        ("last_name", "Enter a valid last name."),
        ("date_of_birth", "Enter a valid date."),
        ("date_of_death", "Enter a valid date."),
    ];
}

/// Body of a form submission
///
/// Unparseable values become field errors with code `invalid`, so a bad date
/// is reported on its field just like a date outside the allowed range.
pub struct FormBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for FormBody<T>
where
    T: DeserializeOwned + FormFields + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let url_encoded = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map_or(false, |ct| ct.starts_with("application/x-www-form-urlencoded"));

        if url_encoded {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| unparseable::<T>(&e.to_string()))?;
            return Ok(FormBody(value));
        }

        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(FormBody(value)),
            Err(JsonRejection::JsonDataError(e)) => Err(unparseable::<T>(&e.body_text())),
            Err(e) => Err(AppError::Validation(e.body_text())),
        }
    }
}

/// Attribute a deserialization failure to the form field it names
fn unparseable<T: FormFields>(message: &str) -> AppError {
    match offending_field(message, T::FIELDS) {
        Some((field, text)) => AppError::field(field, "invalid", text),
        None => AppError::Validation(message.to_string()),
    }
}

/// JSON errors carry the field path (`renewal_date: ...`, `genre_ids[1]: ...`);
/// url-encoded errors do not, so a form with a single field takes the blame
fn offending_field(
    message: &str,
    fields: &'static [(&'static str, &'static str)],
) -> Option<(&'static str, &'static str)> {
    let detail = message
        .split_once("target type: ")
        .map_or(message, |(_, detail)| detail);

    let named = detail.split_once(": ").and_then(|(path, _)| {
        fields.iter().copied().find(|(name, _)| {
            path.strip_prefix(name)
                .map_or(false, |rest| rest.is_empty() || rest.starts_with('[') || rest.starts_with('.'))
        })
    });

    match (named, fields) {
        (Some(field), _) => Some(field),
        (None, [only]) => Some(*only),
        (None, _) => None,
    }
}

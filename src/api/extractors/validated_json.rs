//! JSON extractors that reject with the application's error body.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::domain::ValidationErrors;
use crate::errors::AppError;

/// JSON body whose shape is validated before the handler runs.
///
/// A body that fails to parse is a 400 `BAD_REQUEST`; a parsed body failing
/// its `validator` rules is a 400 `VALIDATION_ERROR` carrying every field.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let JsonBody(value) = JsonBody::<T>::from_request(req, state).await?;

        value
            .validate()
            .map_err(|e| AppError::Validation(field_errors(&e)))?;

        Ok(ValidatedJson(value))
    }
}

/// Plain JSON body, for payloads validated further down by the services.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;

        Ok(JsonBody(value))
    }
}

/// Convert `validator` errors, ordering fields by name so responses are stable.
fn field_errors(errors: &validator::ValidationErrors) -> ValidationErrors {
    let mut fields: Vec<(String, Vec<String>)> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let field = field.to_string();
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                })
                .collect();
            (field, messages)
        })
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let mut result = ValidationErrors::new();
    for (field, messages) in fields {
        for message in messages {
            result.add(&field, message);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Validate)]
    struct Credentials {
        #[validate(length(min = 1, message = "Email is required."))]
        email: String,
        #[validate(length(min = 1, message = "Password is required."))]
        password: String,
    }

    #[test]
    fn test_field_errors_are_sorted_and_keep_messages() {
        let input = Credentials {
            email: String::new(),
            password: String::new(),
        };
        let errors = field_errors(&input.validate().unwrap_err());

        assert_eq!(errors.fields(), vec!["email", "password"]);
        assert_eq!(errors.field("password").unwrap(), ["Password is required."]);
    }
}

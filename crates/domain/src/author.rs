use blog_core::error::require;
use blog_core::{AuthorId, DomainResult};

use crate::view::AuthorView;

/// Author document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    id: AuthorId,
    first_name: String,
    last_name: String,
    user_name: String,
}

impl Author {
    pub fn new(
        id: AuthorId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        user_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            user_name: user_name.into(),
        }
    }

    /// Materialize a validated creation request under a fresh id.
    pub fn create(new: NewAuthor) -> Self {
        Self::new(AuthorId::new(), new.first_name, new.last_name, new.user_name)
    }

    pub fn id_typed(&self) -> AuthorId {
        self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// Display name: first and last name joined by a space, trimmed.
    pub fn author_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Apply the fields present in `patch`; absent fields are left untouched.
    pub fn apply(&mut self, patch: &AuthorPatch) {
        if let Some(first_name) = &patch.first_name {
            self.first_name = first_name.clone();
        }
        if let Some(last_name) = &patch.last_name {
            self.last_name = last_name.clone();
        }
        if let Some(user_name) = &patch.user_name {
            self.user_name = user_name.clone();
        }
    }

    pub fn serialize(&self) -> AuthorView {
        AuthorView {
            id: self.id,
            name: self.author_name(),
            user_name: self.user_name.clone(),
        }
    }
}

/// Validated author creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
}

impl NewAuthor {
    /// Fields are checked in the order `firstName`, `lastName`, `userName`;
    /// the first missing one is reported.
    pub fn try_new(
        first_name: Option<String>,
        last_name: Option<String>,
        user_name: Option<String>,
    ) -> DomainResult<Self> {
        Ok(Self {
            first_name: require("firstName", first_name)?,
            last_name: require("lastName", last_name)?,
            user_name: require("userName", user_name)?,
        })
    }
}

/// Partial author update. Only these three fields are updatable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub user_name: Option<String>,
}

impl AuthorPatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.user_name.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blog_core::DomainError;
    use proptest::prelude::*;

    fn ada() -> Author {
        Author::new(AuthorId::new(), "Ada", "Lovelace", "ada")
    }

    #[test]
    fn author_name_joins_and_trims() {
        assert_eq!(ada().author_name(), "Ada Lovelace");
        let no_last = Author::new(AuthorId::new(), "Plato", "", "plato");
        assert_eq!(no_last.author_name(), "Plato");
    }

    #[test]
    fn try_new_reports_first_missing_field() {
        let err = NewAuthor::try_new(None, None, Some("ada".to_string())).unwrap_err();
        assert_eq!(err, DomainError::MissingField("firstName"));

        let err = NewAuthor::try_new(Some("Ada".to_string()), Some("L".to_string()), None)
            .unwrap_err();
        assert_eq!(err, DomainError::MissingField("userName"));
    }

    #[test]
    fn apply_only_touches_present_fields() {
        let mut author = ada();
        author.apply(&AuthorPatch {
            last_name: Some("King".to_string()),
            ..Default::default()
        });
        assert_eq!(author.first_name(), "Ada");
        assert_eq!(author.last_name(), "King");
        assert_eq!(author.user_name(), "ada");
    }

    #[test]
    fn serialize_uses_derived_name() {
        let author = ada();
        let view = author.serialize();
        assert_eq!(view.id, author.id_typed());
        assert_eq!(view.name, "Ada Lovelace");
        assert_eq!(view.user_name, "ada");
    }

    proptest! {
        #[test]
        fn author_name_never_has_outer_whitespace(first in "[ a-zA-Z]{0,12}", last in "[ a-zA-Z]{0,12}") {
            let author = Author::new(AuthorId::new(), first.clone(), last.clone(), "u");
            let name = author.author_name();
            prop_assert_eq!(name.clone(), format!("{first} {last}").trim().to_string());
            prop_assert_eq!(name.trim(), name.as_str());
        }
    }
}

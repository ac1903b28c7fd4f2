use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub affiliations: Vec<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub is_corresponding: bool,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            affiliations: Vec::new(),
            email: None,
            is_corresponding: false,
        }
    }

    pub fn with_affiliation(mut self, affiliation: impl Into<String>) -> Self {
        self.affiliations.push(affiliation.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn corresponding(mut self) -> Self {
        self.is_corresponding = true;
        self
    }

    /// All affiliations as one free-text string.
    pub fn affiliation(&self) -> String {
        self.affiliations.join("; ")
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.is_empty())
    }
}

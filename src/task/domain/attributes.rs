//! Validated scalar values and descriptive task attributes.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-empty, trimmed task title of at most [`TaskTitle::MAX_CHARS`]
/// characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Longest accepted title, in characters.
    pub const MAX_CHARS: usize = 255;

    /// Creates a validated title.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the value is blank, or
    /// [`TaskDomainError::TitleTooLong`] when the trimmed value exceeds
    /// [`Self::MAX_CHARS`].
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        if trimmed.chars().count() > Self::MAX_CHARS {
            return Err(TaskDomainError::TitleTooLong {
                max: Self::MAX_CHARS,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Positive amount in whole currency units, at most [`Budget::MAX_AMOUNT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Budget(u64);

impl Budget {
    /// Largest accepted amount; matches a signed 64-bit column.
    pub const MAX_AMOUNT: u64 = i64::MAX.unsigned_abs();

    /// Creates a validated budget.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidBudget`] when the amount is zero, or
    /// [`TaskDomainError::BudgetTooLarge`] above [`Self::MAX_AMOUNT`].
    pub const fn new(amount: u64) -> Result<Self, TaskDomainError> {
        if amount == 0 {
            return Err(TaskDomainError::InvalidBudget);
        }
        if amount > Self::MAX_AMOUNT {
            return Err(TaskDomainError::BudgetTooLarge {
                max: Self::MAX_AMOUNT,
            });
        }
        Ok(Self(amount))
    }

    /// Returns the underlying amount.
    #[must_use]
    pub const fn amount(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Descriptive, client-editable task attributes.
///
/// Ownership and assignment live on [`super::Task`] itself and are never part
/// of this type, so an attribute update cannot reassign a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAttributes {
    title: TaskTitle,
    description: String,
    budget: Budget,
    category: Option<String>,
    required_skills: Vec<String>,
}

impl TaskAttributes {
    /// Longest accepted category label, in characters.
    pub const CATEGORY_MAX_CHARS: usize = 100;

    /// Creates attributes with the required fields.
    #[must_use]
    pub fn new(title: TaskTitle, budget: Budget) -> Self {
        Self {
            title,
            description: String::new(),
            budget,
            category: None,
            required_skills: Vec::new(),
        }
    }

    /// Sets the free-form description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the category label; a blank value leaves it unset.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::CategoryTooLong`] when the trimmed label
    /// exceeds [`Self::CATEGORY_MAX_CHARS`].
    pub fn with_category(
        mut self,
        category: impl Into<String>,
    ) -> Result<Self, TaskDomainError> {
        self.category = validate_category(&category.into())?;
        Ok(self)
    }

    /// Sets the required skills, dropping blank entries.
    #[must_use]
    pub fn with_required_skills(mut self, skills: impl IntoIterator<Item = String>) -> Self {
        self.required_skills = normalize_skills(skills);
        self
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the budget.
    #[must_use]
    pub const fn budget(&self) -> Budget {
        self.budget
    }

    /// Returns the category, if any.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Returns the required skills.
    #[must_use]
    pub fn required_skills(&self) -> &[String] {
        &self.required_skills
    }

    /// Applies every field present in `patch`.
    pub(crate) fn apply(&mut self, patch: TaskPatch) {
        let TaskPatch {
            title,
            description,
            budget,
            category,
            required_skills,
        } = patch;
        if let Some(new_title) = title {
            self.title = new_title;
        }
        if let Some(new_description) = description {
            self.description = new_description;
        }
        if let Some(new_budget) = budget {
            self.budget = new_budget;
        }
        if let Some(new_category) = category {
            self.category = new_category;
        }
        if let Some(skills) = required_skills {
            self.required_skills = normalize_skills(skills);
        }
    }
}

/// Validated partial update of [`TaskAttributes`].
///
/// The owner, the assigned worker, the status, and the deadline are not
/// patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    title: Option<TaskTitle>,
    description: Option<String>,
    budget: Option<Budget>,
    category: Option<Option<String>>,
    required_skills: Option<Vec<String>>,
}

impl TaskPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: TaskTitle) -> Self {
        self.title = Some(title);
        self
    }

    /// Replaces the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replaces the budget.
    #[must_use]
    pub const fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Replaces the category; a blank value clears it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::CategoryTooLong`] when the trimmed label
    /// exceeds [`TaskAttributes::CATEGORY_MAX_CHARS`].
    pub fn with_category(
        mut self,
        category: impl Into<String>,
    ) -> Result<Self, TaskDomainError> {
        self.category = Some(validate_category(&category.into())?);
        Ok(self)
    }

    /// Replaces the required skills.
    #[must_use]
    pub fn with_required_skills(mut self, skills: impl IntoIterator<Item = String>) -> Self {
        self.required_skills = Some(skills.into_iter().collect());
        self
    }

    /// Returns `true` when the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.budget.is_none()
            && self.category.is_none()
            && self.required_skills.is_none()
    }
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn validate_category(value: &str) -> Result<Option<String>, TaskDomainError> {
    let label = normalize_optional(value);
    if label
        .as_deref()
        .is_some_and(|text| text.chars().count() > TaskAttributes::CATEGORY_MAX_CHARS)
    {
        return Err(TaskDomainError::CategoryTooLong {
            max: TaskAttributes::CATEGORY_MAX_CHARS,
        });
    }
    Ok(label)
}

fn normalize_skills(skills: impl IntoIterator<Item = String>) -> Vec<String> {
    skills
        .into_iter()
        .filter_map(|skill| normalize_optional(&skill))
        .collect()
}

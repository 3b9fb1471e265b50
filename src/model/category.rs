//! Trigger content categories
//!
//! The category set is closed: prompts, response parsing, and aggregation all
//! work from this single definition.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Content category a chunk can be flagged for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Violence,
    Death,
    SubstanceUse,
    Gore,
    Vomit,
    SexualContent,
    SexualAbuse,
    SelfHarm,
    GunUse,
    AnimalCruelty,
    MentalHealthIssues,
}

impl Category {
    /// All categories in canonical report order
    pub const ALL: [Category; 11] = [
        Category::Violence,
        Category::Death,
        Category::SubstanceUse,
        Category::Gore,
        Category::Vomit,
        Category::SexualContent,
        Category::SexualAbuse,
        Category::SelfHarm,
        Category::GunUse,
        Category::AnimalCruelty,
        Category::MentalHealthIssues,
    ];

    /// Human-readable label, as used in prompts and responses
    pub fn label(&self) -> &'static str {
        match self {
            Category::Violence => "Violence",
            Category::Death => "Death",
            Category::SubstanceUse => "Substance Use",
            Category::Gore => "Gore",
            Category::Vomit => "Vomit",
            Category::SexualContent => "Sexual Content",
            Category::SexualAbuse => "Sexual Abuse",
            Category::SelfHarm => "Self-Harm",
            Category::GunUse => "Gun Use",
            Category::AnimalCruelty => "Animal Cruelty",
            Category::MentalHealthIssues => "Mental Health Issues",
        }
    }

    /// Match a category name ignoring case, spaces, hyphens, and underscores.
    ///
    /// Model responses vary in how they echo category names ("self_harm",
    /// "SELF-HARM", "Self Harm"); all of these resolve to the same variant.
    pub fn from_label_relaxed(raw: &str) -> Option<Category> {
        let folded = fold_name(raw);
        Category::ALL
            .iter()
            .find(|c| fold_name(c.label()) == folded)
            .copied()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lowercase and keep only alphanumeric characters
fn fold_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

use crate::consts;
use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Men,
    Women,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryType {
    Masters,
    Juniors,
}

/// Best-effort annotations guessed from a category name. None of these are
/// authoritative; the site has no structured field for them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTags {
    pub gender: Option<Gender>,
    pub age_range: Option<String>,
    pub category_rank: Option<String>,
    pub category_type: Option<CategoryType>,
}
impl CategoryTags {
    /// Guess tags from a category name such as `"Men Category B 40+"`.
    ///
    /// ```rust
    /// use velodata_extract::models::{CategoryTags, Gender};
    /// let tags = CategoryTags::from_name("Men Category B 40+");
    /// assert_eq!(tags.gender, Some(Gender::Men));
    /// assert_eq!(tags.category_rank.as_deref(), Some("B"));
    /// assert_eq!(tags.age_range.as_deref(), Some("40+"));
    /// assert_eq!(tags.category_type, None);
    /// ```
    pub fn from_name(name: &str) -> Self {
        Self {
            age_range: capture(&consts::AGE_RANGE_REGEX, name).map(|age| age.trim().to_string()),
            ..Self::without_age(name)
        }
    }

    /// [`from_name`](Self::from_name) minus the age range, which is only
    /// meaningful on category listings.
    pub fn without_age(name: &str) -> Self {
        let gender = capture(&consts::GENDER_REGEX, name).and_then(|gender| match gender {
            "Men" => Some(Gender::Men),
            "Women" => Some(Gender::Women),
            _ => None,
        });
        let lowercase = name.to_lowercase();
        // Masters wins when a name mentions both.
        let category_type = if lowercase.contains("masters") {
            Some(CategoryType::Masters)
        } else if lowercase.contains("juniors") {
            Some(CategoryType::Juniors)
        } else {
            None
        };
        Self {
            gender,
            age_range: None,
            category_rank: capture(&consts::RANK_REGEX, name).map(str::to_string),
            category_type,
        }
    }

    /// Overlay `other` on top of these tags; set fields in `other` win.
    pub fn merge(&mut self, other: &CategoryTags) {
        if other.gender.is_some() {
            self.gender = other.gender;
        }
        if other.age_range.is_some() {
            self.age_range.clone_from(&other.age_range);
        }
        if other.category_rank.is_some() {
            self.category_rank.clone_from(&other.category_rank);
        }
        if other.category_type.is_some() {
            self.category_type = other.category_type;
        }
    }
}

fn capture<'a>(regex: &regex::Regex, haystack: &'a str) -> Option<&'a str> {
    regex.captures(haystack).and_then(|captures| captures.get(1)).map(|m| m.as_str())
}

/// One race (category) within a discipline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub race_id: String,
    pub name: String,
    pub info_id: String,
    pub label: String,
    #[serde(flatten)]
    pub tags: CategoryTags,
}
impl CategoryRecord {
    pub fn new(race_id: impl Into<String>, name: impl Into<String>, info_id: &str, label: &str) -> Self {
        let name = name.into();
        Self {
            race_id: race_id.into(),
            tags: CategoryTags::from_name(&name),
            name,
            info_id: info_id.to_string(),
            label: label.to_string(),
        }
    }
}

//! Tag taxonomy
//!
//! A validated, ordered mapping from category name to the tag codes allowed
//! in that category. Built once at startup; lookups never invent an empty
//! list for an unknown category.

use crate::error::{AnnotationError, TaxonomyError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Part-of-speech tag code (e.g. `N_NC`)
///
/// Non-empty, no whitespace, no `/` (the serialized form is `token/tag`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagCode(String);

impl TagCode {
    /// Validate and wrap a tag code
    ///
    /// # Errors
    /// `TaxonomyError::InvalidTagCode` if the code is empty or contains
    /// whitespace or `/`.
    pub fn new(code: impl Into<String>) -> Result<Self, TaxonomyError> {
        let code = code.into();
        if code.is_empty() || code.contains('/') || code.chars().any(char::is_whitespace) {
            return Err(TaxonomyError::InvalidTagCode(code));
        }
        Ok(Self(code))
    }

    /// Code as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TagCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TagCode {
    type Err = TaxonomyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for TagCode {
    type Error = TaxonomyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TagCode> for String {
    fn from(code: TagCode) -> Self {
        code.0
    }
}

/// Lets the reverse index be queried with a plain `&str`
impl Borrow<str> for TagCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TagCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for TagCode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TagCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Two-level category → tag-code taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "IndexMap<String, Vec<String>>",
    into = "IndexMap<String, Vec<String>>"
)]
pub struct TagTaxonomy {
    categories: IndexMap<String, Vec<TagCode>>,
    /// Reverse index: code → owning category
    owners: IndexMap<TagCode, String>,
}

/// Dogri tagset used when no taxonomy is configured
const DOGRI_TAGSET: &[(&str, &[&str])] = &[
    ("Noun", &["N_NC", "N_NP", "N_NST", "N_NV"]),
    ("Verb", &["V_VM", "V_VA"]),
    ("Pronoun", &["P_PPR"]),
    ("Adjective", &["J_JJ", "J_JQ"]),
    ("Determiner", &["D_DAB"]),
    ("Adverb", &["A_AMN"]),
    ("Postposition", &["PP_PP"]),
    ("Particles", &["C_CCD"]),
    ("Numeral", &["NUM_NUMR"]),
    ("Residual", &["RD_RDF"]),
    ("Punctuation", &["PU_PU"]),
];

impl TagTaxonomy {
    /// Build and validate a taxonomy from an ordered category map
    ///
    /// # Errors
    /// - `TaxonomyError::Empty` if there are no categories
    /// - `TaxonomyError::BlankCategory` for a blank category name
    /// - `TaxonomyError::EmptyCategory` for a category without codes
    /// - `TaxonomyError::InvalidTagCode` for a malformed code
    /// - `TaxonomyError::DuplicateTag` if a code appears twice
    pub fn new<C, T>(categories: impl IntoIterator<Item = (C, Vec<T>)>) -> Result<Self, TaxonomyError>
    where
        C: Into<String>,
        T: Into<String>,
    {
        let mut validated: IndexMap<String, Vec<TagCode>> = IndexMap::new();
        let mut owners: IndexMap<TagCode, String> = IndexMap::new();

        for (category, codes) in categories {
            let category = category.into();
            if category.trim().is_empty() {
                return Err(TaxonomyError::BlankCategory);
            }
            if codes.is_empty() {
                return Err(TaxonomyError::EmptyCategory(category));
            }

            let mut list = Vec::with_capacity(codes.len());
            for code in codes {
                let code = TagCode::new(code)?;
                if let Some(first) = owners.get(&code) {
                    return Err(TaxonomyError::DuplicateTag {
                        tag: code.0,
                        first: first.clone(),
                        second: category,
                    });
                }
                owners.insert(code.clone(), category.clone());
                list.push(code);
            }
            validated.insert(category, list);
        }

        if validated.is_empty() {
            return Err(TaxonomyError::Empty);
        }

        Ok(Self {
            categories: validated,
            owners,
        })
    }

    /// The Dogri part-of-speech tagset
    #[must_use]
    pub fn dogri() -> Self {
        let entries = DOGRI_TAGSET
            .iter()
            .map(|(category, codes)| (*category, codes.to_vec()));
        Self::new(entries).expect("built-in tagset is valid")
    }

    /// Category names in configuration order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Number of categories
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Always false for a validated taxonomy
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Whether `category` is a key of the taxonomy
    #[inline]
    #[must_use]
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    /// Allowed codes for `category`
    ///
    /// # Errors
    /// `AnnotationError::UnknownCategory` if the category does not exist.
    pub fn tags_for(&self, category: &str) -> Result<&[TagCode], AnnotationError> {
        self.categories
            .get(category)
            .map(Vec::as_slice)
            .ok_or_else(|| AnnotationError::UnknownCategory(category.to_string()))
    }

    /// Resolve a code inside `category`
    ///
    /// # Errors
    /// `UnknownCategory` or `TagNotInCategory`.
    pub fn resolve(&self, category: &str, code: &str) -> Result<&TagCode, AnnotationError> {
        self.tags_for(category)?
            .iter()
            .find(|t| t.as_str() == code)
            .ok_or_else(|| AnnotationError::TagNotInCategory {
                category: category.to_string(),
                tag: code.to_string(),
            })
    }

    /// Whether `code` is allowed in `category`
    #[must_use]
    pub fn contains(&self, category: &str, code: &str) -> bool {
        self.resolve(category, code).is_ok()
    }

    /// Category that owns `code`, if any
    #[must_use]
    pub fn category_of(&self, code: &str) -> Option<&str> {
        self.owners.get(code).map(String::as_str)
    }

    /// Iterate `(category, codes)` in configuration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[TagCode])> {
        self.categories
            .iter()
            .map(|(category, codes)| (category.as_str(), codes.as_slice()))
    }
}

impl Default for TagTaxonomy {
    fn default() -> Self {
        Self::dogri()
    }
}

impl TryFrom<IndexMap<String, Vec<String>>> for TagTaxonomy {
    type Error = TaxonomyError;

    fn try_from(value: IndexMap<String, Vec<String>>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TagTaxonomy> for IndexMap<String, Vec<String>> {
    fn from(taxonomy: TagTaxonomy) -> Self {
        taxonomy
            .categories
            .into_iter()
            .map(|(category, codes)| (category, codes.into_iter().map(String::from).collect()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dogri_tagset_has_eleven_categories() {
        let taxonomy = TagTaxonomy::dogri();
        assert_eq!(taxonomy.len(), 11);
        assert_eq!(taxonomy.categories().next(), Some("Noun"));
        assert_eq!(taxonomy.categories().last(), Some("Punctuation"));
        assert_eq!(taxonomy.tags_for("Noun").unwrap().len(), 4);
    }

    #[test]
    fn unknown_category_is_an_error_not_an_empty_list() {
        let taxonomy = TagTaxonomy::dogri();
        assert_eq!(
            taxonomy.tags_for("Conjunction"),
            Err(AnnotationError::UnknownCategory("Conjunction".into()))
        );
    }

    #[test]
    fn resolve_checks_membership() {
        let taxonomy = TagTaxonomy::dogri();
        assert_eq!(taxonomy.resolve("Noun", "N_NP").unwrap(), &"N_NP");
        assert!(matches!(
            taxonomy.resolve("Noun", "V_VM"),
            Err(AnnotationError::TagNotInCategory { .. })
        ));
        assert!(taxonomy.contains("Verb", "V_VA"));
        assert!(!taxonomy.contains("Verb", "N_NC"));
    }

    #[test]
    fn category_of_uses_reverse_index() {
        let taxonomy = TagTaxonomy::dogri();
        assert_eq!(taxonomy.category_of("PU_PU"), Some("Punctuation"));
        assert_eq!(taxonomy.category_of("XX"), None);

        let custom =
            TagTaxonomy::new([("Noun", vec!["N_NC"]), ("Verb", vec!["V_VM", "V_VA"])]).unwrap();
        assert_eq!(custom.category_of("V_VA"), Some("Verb"));
        assert_eq!(custom.category_of("v_va"), None);
    }

    #[test]
    fn validation_rejects_misconfiguration() {
        let empty: Vec<(&str, Vec<&str>)> = Vec::new();
        assert_eq!(TagTaxonomy::new(empty), Err(TaxonomyError::Empty));

        assert_eq!(
            TagTaxonomy::new([("Noun", Vec::<&str>::new())]),
            Err(TaxonomyError::EmptyCategory("Noun".into()))
        );

        assert_eq!(
            TagTaxonomy::new([(" ", vec!["N_NC"])]),
            Err(TaxonomyError::BlankCategory)
        );

        assert_eq!(
            TagTaxonomy::new([("Noun", vec!["N/NC"])]),
            Err(TaxonomyError::InvalidTagCode("N/NC".into()))
        );

        assert_eq!(
            TagTaxonomy::new([("Noun", vec!["N_NC"]), ("Other", vec!["N_NC"])]),
            Err(TaxonomyError::DuplicateTag {
                tag: "N_NC".into(),
                first: "Noun".into(),
                second: "Other".into(),
            })
        );
    }

    #[test]
    fn tag_code_rejects_whitespace() {
        assert!(TagCode::new("N NC").is_err());
        assert!(TagCode::new("").is_err());
        assert!("N_NC".parse::<TagCode>().is_ok());
    }
}

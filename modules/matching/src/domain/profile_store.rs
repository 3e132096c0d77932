//! Profile merge and validation rules.
//!
//! Every write goes through [`ProfileRules::merge`]: the input is laid over the
//! stored record, tags are normalized, photos are truncated, the avatar is
//! re-derived and the result is validated as a whole. Nothing is written when
//! validation fails.

use chrono::Utc;

use crate::contract::model::{Profile, ProfileInput};
use crate::domain::error::{rule, DomainError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileRules {
    pub min_photos: usize,
    pub max_photos: usize,
}

impl Default for ProfileRules {
    fn default() -> Self {
        Self {
            min_photos: 2,
            max_photos: 9,
        }
    }
}

impl ProfileRules {
    /// Swipeable: required scalars set and at least `min_photos` photos.
    pub fn is_complete(&self, p: &Profile) -> bool {
        self.missing_field(p).is_none() && p.photos.len() >= self.min_photos
    }

    /// Merge `input` over `existing` (or an empty record) and validate.
    pub fn merge(
        &self,
        identity: &str,
        existing: Option<Profile>,
        input: ProfileInput,
    ) -> Result<Profile, DomainError> {
        let mut p = existing.unwrap_or_else(|| Profile::empty(identity));

        if let Some(name) = input.name {
            p.name = name.trim().to_string();
        }
        if let Some(birthday) = input.birthday {
            p.birthday = Some(birthday);
        }
        if let Some(gender) = input.gender {
            p.gender = gender.trim().to_string();
        }
        if let Some(timezone) = input.timezone {
            p.timezone = timezone.trim().to_string();
        }
        if let Some(skills) = input.skills {
            p.skills = normalize_tags(skills);
        }
        if !input.skills_add.is_empty() {
            let mut all = std::mem::take(&mut p.skills);
            all.extend(input.skills_add);
            p.skills = normalize_tags(all);
        }
        if !input.skills_remove.is_empty() {
            p.skills
                .retain(|s| !input.skills_remove.iter().any(|r| r.trim() == s.as_str()));
        }
        if let Some(looking_for) = input.looking_for {
            p.looking_for = normalize_tags(looking_for);
        }
        if let Some(v) = input.time_commitment {
            p.time_commitment = non_blank(v);
        }
        if let Some(v) = input.project_vibe {
            p.project_vibe = non_blank(v);
        }
        if let Some(b) = input.is_boosted {
            p.is_boosted = b;
        }
        if let Some(mut photos) = input.photos {
            photos.truncate(self.max_photos);
            p.photos = photos.into_iter().map(|u| u.trim().to_string()).collect();
        }

        p.avatar = p.photos.first().cloned().unwrap_or_default();
        p.identity = identity.to_string();
        p.updated_at = Utc::now();

        self.validate(&p)?;
        Ok(p)
    }

    pub fn validate(&self, p: &Profile) -> Result<(), DomainError> {
        if let Some((rule, field)) = self.missing_field(p) {
            return Err(DomainError::validation(rule, format!("{field} is required")));
        }
        let n = p.photos.len();
        if n < self.min_photos || n > self.max_photos {
            return Err(DomainError::validation(
                rule::PHOTO_COUNT,
                format!(
                    "between {} and {} photos are required, got {n}",
                    self.min_photos, self.max_photos
                ),
            ));
        }
        for (i, photo) in p.photos.iter().enumerate() {
            if url::Url::parse(photo).is_err() {
                return Err(DomainError::validation(
                    rule::PHOTO_URL,
                    format!("photo #{} is not an absolute URL", i + 1),
                ));
            }
        }
        Ok(())
    }

    fn missing_field(&self, p: &Profile) -> Option<(&'static str, &'static str)> {
        if p.name.is_empty() {
            Some((rule::NAME_REQUIRED, "name"))
        } else if p.birthday.is_none() {
            Some((rule::BIRTHDAY_REQUIRED, "birthday"))
        } else if p.gender.is_empty() {
            Some((rule::GENDER_REQUIRED, "gender"))
        } else if p.timezone.is_empty() {
            Some((rule::TIMEZONE_REQUIRED, "timezone"))
        } else {
            None
        }
    }
}

/// Trim, drop blanks and duplicates; first occurrence wins.
pub fn normalize_tags(tags: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

fn non_blank(v: String) -> Option<String> {
    let v = v.trim();
    (!v.is_empty()).then(|| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn photos(n: usize) -> Vec<String> {
        (0..n)
            .map(|i| format!("https://cdn.example.com/p/{i}.jpg"))
            .collect()
    }

    fn full_input(n_photos: usize) -> ProfileInput {
        ProfileInput {
            name: Some("Ada Lovelace".into()),
            birthday: NaiveDate::from_ymd_opt(1990, 12, 10),
            gender: Some("female".into()),
            timezone: Some("Europe/London".into()),
            photos: Some(photos(n_photos)),
            skills: Some(vec!["Rust".into(), "Math".into()]),
            ..Default::default()
        }
    }

    #[test]
    fn avatar_is_first_photo() {
        let p = ProfileRules::default()
            .merge("ada", None, full_input(3))
            .unwrap();
        assert_eq!(p.avatar, p.photos[0]);
        assert_eq!(p.identity, "ada");
    }

    #[test]
    fn photo_count_bounds() {
        let rules = ProfileRules::default();
        for ok in [2, 9] {
            assert!(rules.merge("ada", None, full_input(ok)).is_ok(), "{ok} photos");
        }
        for bad in [0, 1] {
            let err = rules.merge("ada", None, full_input(bad)).unwrap_err();
            assert_eq!(err.rule(), Some(rule::PHOTO_COUNT), "{bad} photos");
        }
    }

    #[test]
    fn extra_photos_are_truncated_to_first_nine() {
        let p = ProfileRules::default()
            .merge("ada", None, full_input(12))
            .unwrap();
        assert_eq!(p.photos, photos(9));
    }

    #[test]
    fn required_fields_reported_by_rule() {
        let rules = ProfileRules::default();
        let cases = [
            (ProfileInput { name: Some("  ".into()), ..full_input(2) }, rule::NAME_REQUIRED),
            (ProfileInput { birthday: None, ..full_input(2) }, rule::BIRTHDAY_REQUIRED),
            (ProfileInput { gender: Some(String::new()), ..full_input(2) }, rule::GENDER_REQUIRED),
            (ProfileInput { timezone: None, ..full_input(2) }, rule::TIMEZONE_REQUIRED),
        ];
        for (input, expected) in cases {
            let err = rules.merge("ada", None, input).unwrap_err();
            assert_eq!(err.rule(), Some(expected));
        }
    }

    #[test]
    fn merge_preserves_fields_absent_from_input() {
        let rules = ProfileRules::default();
        let first = rules.merge("ada", None, full_input(2)).unwrap();

        let second = rules
            .merge(
                "ada",
                Some(first.clone()),
                ProfileInput {
                    gender: Some("other".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(second.gender, "other");
        assert_eq!(second.name, first.name);
        assert_eq!(second.photos, first.photos);
        assert_eq!(second.skills, first.skills);
    }

    #[test]
    fn tags_are_trimmed_and_deduplicated_in_order() {
        let rules = ProfileRules::default();
        let p = rules
            .merge(
                "ada",
                None,
                ProfileInput {
                    skills: Some(vec![" Rust".into(), "Go".into(), "Rust".into(), "".into()]),
                    skills_add: vec!["Go".into(), "Python ".into()],
                    skills_remove: vec![" Go".into()],
                    looking_for: Some(vec!["designer".into(), "designer".into()]),
                    ..full_input(2)
                },
            )
            .unwrap();
        assert_eq!(p.skills, vec!["Rust", "Python"]);
        assert_eq!(p.looking_for, vec!["designer"]);
    }

    #[test]
    fn relative_photo_url_is_rejected() {
        let err = ProfileRules::default()
            .merge(
                "ada",
                None,
                ProfileInput {
                    photos: Some(vec!["https://cdn.example.com/a.jpg".into(), "b.jpg".into()]),
                    ..full_input(0)
                },
            )
            .unwrap_err();
        assert_eq!(err.rule(), Some(rule::PHOTO_URL));
    }

    #[test]
    fn completeness() {
        let rules = ProfileRules::default();
        let mut p = rules.merge("ada", None, full_input(2)).unwrap();
        assert!(rules.is_complete(&p));
        p.photos.pop();
        assert!(!rules.is_complete(&p));
        assert!(!rules.is_complete(&Profile::empty("bob")));
    }
}

//! Shared query parameter types for API handlers.

use brandquiz_core::analytics::DateRange;
use brandquiz_core::answers::check_option;
use brandquiz_core::error::CoreError;
use brandquiz_core::options::{ExperienceLevel, GeographicLocation, Industry, Labeled, RatingType};
use brandquiz_core::ratings::RatingFilter;
use serde::{Deserialize, Serialize};

/// Date window parameters (`?startDate=&endDate=`).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl DateRangeParams {
    pub fn parse(&self) -> Result<DateRange, CoreError> {
        DateRange::parse(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

/// Demographic and date filters shared by the rating statistics endpoints.
///
/// Values are option labels, e.g. `?geographicLocation=Europe`.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingFilterParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geographic_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry_preference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl RatingFilterParams {
    /// Resolve labels and dates into a core filter. Every bad label is
    /// reported together.
    pub fn to_filter(&self, rating_type: Option<RatingType>) -> Result<RatingFilter, CoreError> {
        let mut errors = Vec::new();
        let geographic_location = check_option::<GeographicLocation>(
            "geographicLocation",
            non_empty(&self.geographic_location),
            &mut errors,
        );
        let industry_preference = check_option::<Industry>(
            "industryPreference",
            non_empty(&self.industry_preference),
            &mut errors,
        );
        let experience_level = check_option::<ExperienceLevel>(
            "experienceLevel",
            non_empty(&self.experience_level),
            &mut errors,
        );
        if !errors.is_empty() {
            return Err(CoreError::InvalidFields(errors));
        }

        Ok(RatingFilter {
            rating_type,
            geographic_location,
            industry_preference,
            experience_level,
            range: DateRange::parse(self.start_date.as_deref(), self.end_date.as_deref())?,
        })
    }
}

/// Parse an optional option label from a query or path parameter.
pub fn parse_label<T: Labeled>(field: &str, value: Option<&str>) -> Result<Option<T>, CoreError> {
    let mut errors = Vec::new();
    let parsed = check_option::<T>(field, value.filter(|v| !v.trim().is_empty()), &mut errors);
    if errors.is_empty() {
        Ok(parsed)
    } else {
        Err(CoreError::InvalidFields(errors))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn empty_params_give_an_open_filter() {
        let filter = RatingFilterParams::default().to_filter(None).unwrap();
        assert_eq!(filter, RatingFilter::default());
    }

    #[test]
    fn labels_resolve_to_options() {
        let params = RatingFilterParams {
            geographic_location: Some("Europe".to_string()),
            industry_preference: Some("Technology & IT".to_string()),
            ..Default::default()
        };
        let filter = params.to_filter(Some(RatingType::HeroSlogans)).unwrap();
        assert_eq!(filter.geographic_location, Some(GeographicLocation::Europe));
        assert_eq!(filter.rating_type, Some(RatingType::HeroSlogans));
    }

    #[test]
    fn unknown_labels_are_reported_per_field() {
        let params = RatingFilterParams {
            geographic_location: Some("Atlantis".to_string()),
            experience_level: Some("forever".to_string()),
            ..Default::default()
        };
        let err = params.to_filter(None).unwrap_err();
        assert_matches!(err, CoreError::InvalidFields(fields) if fields.len() == 2);
    }

    #[test]
    fn parse_label_treats_blank_as_absent() {
        assert_eq!(parse_label::<RatingType>("ratingType", Some(" ")).unwrap(), None);
        assert_matches!(
            parse_label::<RatingType>("ratingType", Some("nope")),
            Err(CoreError::InvalidFields(_))
        );
    }
}

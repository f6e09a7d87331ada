//! Static governorate → region classification.

use super::{Diagnostic, DiagnosticSink, UNKNOWN_REGION};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Top-level grouping of governorates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    Capital,
    Alexandria,
    Canal,
    #[serde(rename = "Upper Egypt")]
    UpperEgypt,
    #[serde(rename = "Lower Egypt")]
    LowerEgypt,
    Border,
}

impl Region {
    /// Every region, in classification order.
    pub const ALL: [Region; 6] = [
        Region::Capital,
        Region::Alexandria,
        Region::Canal,
        Region::UpperEgypt,
        Region::LowerEgypt,
        Region::Border,
    ];

    /// Label written to the `region` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Capital => "Capital",
            Self::Alexandria => "Alexandria",
            Self::Canal => "Canal",
            Self::UpperEgypt => "Upper Egypt",
            Self::LowerEgypt => "Lower Egypt",
            Self::Border => "Border",
        }
    }

    /// Governorates belonging to this region.
    pub fn governorates(&self) -> &'static [&'static str] {
        match self {
            Self::Capital => &["Cairo", "Giza"],
            Self::Alexandria => &["Alexandria"],
            Self::Canal => &["Port Said", "Ismailia", "Suez"],
            Self::UpperEgypt => &[
                "Sohag",
                "Aswan",
                "Minya",
                "Luxor",
                "Asyut",
                "Qena",
                "Beni Suef",
                "Fayoum",
            ],
            Self::LowerEgypt => &[
                "Qalyubia",
                "Dakahlia",
                "Gharbia",
                "Beheira",
                "Monufia",
                "Kafr al-Sheikh",
                "Damietta",
                "Sharqia",
            ],
            Self::Border => &[
                "Red Sea",
                "South Sinai",
                "New Valley",
                "Matruh",
                "North Sinai",
            ],
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Governorate lookup - built once on first use.
// On a duplicated governorate the earlier region in `Region::ALL` wins.
static REGION_TABLE: Lazy<HashMap<&'static str, Region>> = Lazy::new(|| {
    let mut table = HashMap::new();
    for region in Region::ALL {
        for governorate in region.governorates() {
            table.entry(*governorate).or_insert(region);
        }
    }
    table
});

/// Maps a resolved governorate to its [`Region`].
pub struct RegionClassifier;

impl RegionClassifier {
    /// Pure table lookup, exact match.
    pub fn lookup(governorate: &str) -> Option<Region> {
        REGION_TABLE.get(governorate).copied()
    }

    /// Classify an optional governorate.
    ///
    /// Missing input yields `None` silently. A governorate outside the table
    /// yields `None` and emits [`Diagnostic::UnknownGovernorate`].
    pub fn classify(governorate: Option<&str>, sink: &dyn DiagnosticSink) -> Option<Region> {
        let governorate = governorate?;
        let region = Self::lookup(governorate);
        if region.is_none() {
            sink.emit(Diagnostic::UnknownGovernorate {
                governorate: governorate.to_string(),
            });
        }
        region
    }

    /// Column label for a classification result; `"nan"` when unclassified.
    pub fn label(region: Option<Region>) -> &'static str {
        region.map_or(UNKNOWN_REGION, |r| r.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::RecordingSink;

    #[test]
    fn test_lookup_known_governorates() {
        assert_eq!(RegionClassifier::lookup("Cairo"), Some(Region::Capital));
        assert_eq!(RegionClassifier::lookup("Giza"), Some(Region::Capital));
        assert_eq!(
            RegionClassifier::lookup("Alexandria"),
            Some(Region::Alexandria)
        );
        assert_eq!(RegionClassifier::lookup("Suez"), Some(Region::Canal));
        assert_eq!(
            RegionClassifier::lookup("Beni Suef"),
            Some(Region::UpperEgypt)
        );
        assert_eq!(
            RegionClassifier::lookup("Kafr al-Sheikh"),
            Some(Region::LowerEgypt)
        );
        assert_eq!(RegionClassifier::lookup("Red Sea"), Some(Region::Border));
    }

    #[test]
    fn test_lookup_is_exact_match() {
        assert_eq!(RegionClassifier::lookup("cairo"), None);
        assert_eq!(RegionClassifier::lookup(" Cairo"), None);
    }

    #[test]
    fn test_table_covers_every_member_once() {
        let members: usize = Region::ALL.iter().map(|r| r.governorates().len()).sum();
        assert_eq!(REGION_TABLE.len(), members);
        for region in Region::ALL {
            for governorate in region.governorates() {
                assert_eq!(RegionClassifier::lookup(governorate), Some(region));
            }
        }
    }

    #[test]
    fn test_classify_missing_is_silent() {
        let sink = RecordingSink::new();
        assert_eq!(RegionClassifier::classify(None, &sink), None);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_classify_unknown_emits_diagnostic() {
        let sink = RecordingSink::new();
        assert_eq!(RegionClassifier::classify(Some("error city"), &sink), None);
        assert_eq!(
            sink.diagnostics(),
            vec![Diagnostic::UnknownGovernorate {
                governorate: "error city".to_string()
            }]
        );
    }

    #[test]
    fn test_label() {
        assert_eq!(RegionClassifier::label(Some(Region::UpperEgypt)), "Upper Egypt");
        assert_eq!(RegionClassifier::label(None), "nan");
    }

    #[test]
    fn test_region_serializes_to_label() {
        for region in Region::ALL {
            let json = serde_json::to_string(&region).unwrap();
            assert_eq!(json, format!("\"{}\"", region.as_str()));
        }
    }
}

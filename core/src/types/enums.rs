use std::fmt;

/// Anode target / beam filtration combination identifying the x-ray spectrum
///
/// Each combination carries a fixed relative sensitivity factor `s` used in
/// the final dose composition. The factor is a tabulated constant and is
/// treated as exact during uncertainty propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub enum TargetFilter {
    #[serde(rename = "Mo/Mo")]
    MoMo,
    #[serde(rename = "Mo/Rh")]
    MoRh,
    #[serde(rename = "Rh/Rh")]
    RhRh,
    #[serde(rename = "Rh/Al")]
    RhAl,
    #[serde(rename = "W/Rh")]
    WRh,
}

impl TargetFilter {
    /// All supported combinations, in display order
    pub const ALL: [TargetFilter; 5] = [
        TargetFilter::MoMo,
        TargetFilter::MoRh,
        TargetFilter::RhRh,
        TargetFilter::RhAl,
        TargetFilter::WRh,
    ];

    /// Relative sensitivity factor `s` for this spectrum
    pub fn s_factor(&self) -> f64 {
        match self {
            TargetFilter::MoMo => 1.0,
            TargetFilter::MoRh => 1.017,
            TargetFilter::RhRh => 1.061,
            TargetFilter::RhAl => 1.044,
            TargetFilter::WRh => 1.042,
        }
    }

    /// Returns the conventional "Target/Filter" label
    pub fn label(&self) -> &'static str {
        match self {
            TargetFilter::MoMo => "Mo/Mo",
            TargetFilter::MoRh => "Mo/Rh",
            TargetFilter::RhRh => "Rh/Rh",
            TargetFilter::RhAl => "Rh/Al",
            TargetFilter::WRh => "W/Rh",
        }
    }

    /// Parses a target/filter combination from its conventional label
    ///
    /// Accepts the "Target/Filter" spelling in any case, with or without
    /// surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mo/mo" => Some(TargetFilter::MoMo),
            "mo/rh" => Some(TargetFilter::MoRh),
            "rh/rh" => Some(TargetFilter::RhRh),
            "rh/al" => Some(TargetFilter::RhAl),
            "w/rh" => Some(TargetFilter::WRh),
            _ => None,
        }
    }
}

impl fmt::Display for TargetFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Glandularity group used to select the c-Factor coefficient column
///
/// Groups partition the glandularity percentage at fixed breakpoints:
/// ≤25, ≤50, ≤75, >75 map to groups 1-4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum GlandularityGroup {
    Group1,
    Group2,
    Group3,
    Group4,
}

impl GlandularityGroup {
    /// Resolves the group for a glandularity percentage
    pub fn from_percent(percent: f64) -> Self {
        if percent <= 25.0 {
            GlandularityGroup::Group1
        } else if percent <= 50.0 {
            GlandularityGroup::Group2
        } else if percent <= 75.0 {
            GlandularityGroup::Group3
        } else {
            GlandularityGroup::Group4
        }
    }

    /// Returns the 1-based group number
    pub fn number(&self) -> u8 {
        match self {
            GlandularityGroup::Group1 => 1,
            GlandularityGroup::Group2 => 2,
            GlandularityGroup::Group3 => 3,
            GlandularityGroup::Group4 => 4,
        }
    }

    /// Zero-based column index into a c-Factor coefficient row
    pub(crate) fn index(&self) -> usize {
        self.number() as usize - 1
    }
}

impl fmt::Display for GlandularityGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_s_factors() {
        assert_eq!(TargetFilter::MoMo.s_factor(), 1.0);
        assert_eq!(TargetFilter::MoRh.s_factor(), 1.017);
        assert_eq!(TargetFilter::RhRh.s_factor(), 1.061);
        assert_eq!(TargetFilter::RhAl.s_factor(), 1.044);
        assert_eq!(TargetFilter::WRh.s_factor(), 1.042);
    }

    #[rstest]
    #[case("Mo/Mo", TargetFilter::MoMo)]
    #[case("mo/rh", TargetFilter::MoRh)]
    #[case(" Rh/Rh ", TargetFilter::RhRh)]
    #[case("W/RH", TargetFilter::WRh)]
    fn test_parse_label(#[case] input: &str, #[case] expected: TargetFilter) {
        assert_eq!(TargetFilter::parse(input), Some(expected));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(TargetFilter::parse("Cu/Al"), None);
        assert_eq!(TargetFilter::parse(""), None);
    }

    #[test]
    fn test_label_round_trip() {
        for tf in TargetFilter::ALL {
            assert_eq!(TargetFilter::parse(tf.label()), Some(tf));
        }
    }

    #[rstest]
    #[case(0.0, 1)]
    #[case(25.0, 1)]
    #[case(25.1, 2)]
    #[case(50.0, 2)]
    #[case(75.0, 3)]
    #[case(75.1, 4)]
    #[case(100.0, 4)]
    fn test_group_breakpoints(#[case] percent: f64, #[case] number: u8) {
        assert_eq!(GlandularityGroup::from_percent(percent).number(), number);
    }
}

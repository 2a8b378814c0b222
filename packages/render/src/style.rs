//! Fixed color policies for map output.

use std::str::FromStr as _;

use scooter_grid_models::{DemandLevel, TransportCategory};

/// Rectangle color for a demand level: red for high, orange for
/// medium, green for low, gray for cells with nothing nearby.
#[must_use]
pub const fn demand_color(level: DemandLevel) -> &'static str {
    match level {
        DemandLevel::High => "red",
        DemandLevel::Medium => "orange",
        DemandLevel::Low => "green",
        DemandLevel::None => "gray",
    }
}

/// Marker color for a transport category string. Unknown categories
/// render gray rather than failing.
#[must_use]
pub fn category_color(category: &str) -> &'static str {
    match TransportCategory::from_str(category) {
        Ok(TransportCategory::Bus) => "blue",
        Ok(TransportCategory::Tram) => "green",
        Ok(TransportCategory::Metro) => "red",
        Err(_) => "gray",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scooter_grid_models::DemandThresholds;

    #[test]
    fn demand_colors_follow_the_threshold_policy() {
        let t = DemandThresholds::default();
        assert_eq!(demand_color(DemandLevel::classify(120, t)), "red");
        assert_eq!(demand_color(DemandLevel::classify(60, t)), "orange");
        assert_eq!(demand_color(DemandLevel::classify(3, t)), "green");
        assert_eq!(demand_color(DemandLevel::classify(0, t)), "gray");
    }

    #[test]
    fn category_colors_match_the_reference_palette() {
        assert_eq!(category_color("Bus"), "blue");
        assert_eq!(category_color("Tram"), "green");
        assert_eq!(category_color("Métro"), "red");
        assert_eq!(category_color("Funicular"), "gray");
    }
}

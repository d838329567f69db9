use crate::models::GeoPoint;

/// Initial zoom for the service-area map. Street level, matches the mobile app.
pub const MAP_ZOOM: i32 = 15;

/// Props for the service-area map widget. Constructed only for profiles with
/// a usable location; pages without one render a static placeholder instead.
#[derive(Debug, Clone)]
pub struct FixerMapView {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
    pub photo_url: Option<String>,
}

impl FixerMapView {
    pub fn from_location(
        location: Option<&GeoPoint>,
        display_name: &str,
        photo_url: Option<&str>,
    ) -> Option<Self> {
        let point = location?;
        if !has_usable_coords(point) {
            return None;
        }
        Some(Self {
            latitude: point.lat,
            longitude: point.lng,
            display_name: display_name.to_string(),
            photo_url: photo_url.map(|s| s.to_string()),
        })
    }

    /// Boot configuration for the widget script. Embedded in the page as an
    /// HTML-escaped data attribute, so name/photo never reach the DOM raw.
    pub fn boot_config_json(&self) -> String {
        serde_json::json!({
            "lat": self.latitude,
            "lng": self.longitude,
            "zoom": MAP_ZOOM,
            "name": self.display_name,
            "photoUrl": self.photo_url,
        })
        .to_string()
    }
}

// Coordinates at the origin (or either axis zero) mean "not set" in the
// marketplace data, the same convention the mobile clients use.
fn has_usable_coords(p: &GeoPoint) -> bool {
    p.lat.is_finite() && p.lng.is_finite() && p.lat != 0.0 && p.lng != 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_location_builds_no_map() {
        assert!(FixerMapView::from_location(None, "Carlos", None).is_none());
    }

    #[test]
    fn test_zeroed_coords_build_no_map() {
        let origin = GeoPoint { lat: 0.0, lng: 0.0 };
        assert!(FixerMapView::from_location(Some(&origin), "Carlos", None).is_none());

        let half = GeoPoint {
            lat: -17.4,
            lng: 0.0,
        };
        assert!(FixerMapView::from_location(Some(&half), "Carlos", None).is_none());
    }

    #[test]
    fn test_map_centers_on_profile_location() {
        let point = GeoPoint {
            lat: -17.4,
            lng: -66.2,
        };
        let map = FixerMapView::from_location(Some(&point), "Carlos", Some("/p.jpg"))
            .unwrap();
        assert_eq!(map.latitude, -17.4);
        assert_eq!(map.longitude, -66.2);

        let config: serde_json::Value = serde_json::from_str(&map.boot_config_json()).unwrap();
        assert_eq!(config["lat"], serde_json::json!(-17.4));
        assert_eq!(config["lng"], serde_json::json!(-66.2));
        assert_eq!(config["zoom"], serde_json::json!(MAP_ZOOM));
        assert_eq!(config["name"], serde_json::json!("Carlos"));
        assert_eq!(config["photoUrl"], serde_json::json!("/p.jpg"));
    }

    #[test]
    fn test_missing_photo_serializes_as_null() {
        let point = GeoPoint {
            lat: -17.4,
            lng: -66.2,
        };
        let map = FixerMapView::from_location(Some(&point), "Carlos", None).unwrap();
        let config: serde_json::Value = serde_json::from_str(&map.boot_config_json()).unwrap();
        assert!(config["photoUrl"].is_null());
    }

    #[test]
    fn test_hostile_display_name_stays_inside_json() {
        let point = GeoPoint {
            lat: -17.4,
            lng: -66.2,
        };
        let name = "<script>alert('x')</script>\"";
        let map = FixerMapView::from_location(Some(&point), name, None).unwrap();
        let config: serde_json::Value = serde_json::from_str(&map.boot_config_json()).unwrap();
        assert_eq!(config["name"], serde_json::json!(name));
    }
}

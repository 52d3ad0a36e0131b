//! Request parameters and batch bodies for the Geocodio endpoints.
//!
//! Everything here is pure: validation failures are reported before a
//! request exists, so no network call is ever made for bad input.

use crate::{error::GeocodioError, model::Coordinates};

/// Well-known values for the `fields` parameter.
///
/// Field names are passed to the service verbatim; these are only
/// conveniences, not an allow-list. Each field is billed as an extra lookup.
pub mod field {
    pub const TIMEZONE: &str = "timezone";
    pub const ZIP4: &str = "zip4";
    pub const CONGRESSIONAL_DISTRICT: &str = "cd";
    pub const STATE_LEGISLATIVE_DISTRICTS: &str = "stateleg";
    pub const SCHOOL_DISTRICTS: &str = "school";
    pub const CENSUS: &str = "census";
}

/// Query-string parameters for a single lookup, in insertion order.
pub type Params = Vec<(&'static str, String)>;

/// Formats a coordinate with the fixed nine-digit precision the service expects.
pub fn format_coordinate(value: f64) -> String {
    format!("{value:.9}")
}

pub fn format_pair(latitude: f64, longitude: f64) -> String {
    format!("{},{}", format_coordinate(latitude), format_coordinate(longitude))
}

/// Joins field names with commas; `None` when there is nothing to request.
pub fn fields_param<S: AsRef<str>>(fields: &[S]) -> Option<String> {
    if fields.is_empty() {
        return None;
    }

    let joined = fields.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",");
    Some(joined)
}

fn push_fields<S: AsRef<str>>(params: &mut Params, fields: &[S]) {
    if let Some(joined) = fields_param(fields) {
        params.push(("fields", joined));
    }
}

/// Parameters for `GET /geocode`.
pub fn forward<S: AsRef<str>>(address: &str, fields: &[S]) -> Result<Params, GeocodioError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(GeocodioError::EmptyAddress);
    }

    let mut params = vec![("q", address.to_string())];
    push_fields(&mut params, fields);
    Ok(params)
}

/// Parameters for `GET /reverse`.
pub fn reverse<S: AsRef<str>>(
    latitude: f64,
    longitude: f64,
    fields: &[S],
) -> Result<Params, GeocodioError> {
    if Coordinates::new(latitude, longitude).is_unset() {
        return Err(GeocodioError::MissingCoordinates);
    }

    let mut params = vec![("q", format_pair(latitude, longitude))];
    push_fields(&mut params, fields);
    Ok(params)
}

/// Body for `POST /geocode`: the addresses, in order.
pub fn batch_forward<S: AsRef<str>>(addresses: &[S]) -> Result<Vec<String>, GeocodioError> {
    if addresses.is_empty() {
        return Err(GeocodioError::EmptyBatch);
    }

    Ok(addresses.iter().map(|a| a.as_ref().to_string()).collect())
}

/// Body for `POST /reverse` from typed coordinates.
pub fn batch_reverse(coordinates: &[Coordinates]) -> Result<Vec<String>, GeocodioError> {
    let flat: Vec<f64> = coordinates
        .iter()
        .flat_map(|c| [c.latitude, c.longitude])
        .collect();

    batch_reverse_flat(&flat)
}

/// Body for `POST /reverse` from alternating latitude/longitude values.
///
/// Even positions open a pair and odd positions close it, so
/// `[lat1, lng1, lat2, lng2]` becomes `["lat1,lng1", "lat2,lng2"]`.
pub fn batch_reverse_flat(latlngs: &[f64]) -> Result<Vec<String>, GeocodioError> {
    if latlngs.is_empty() {
        return Err(GeocodioError::EmptyBatch);
    }
    if latlngs.len() % 2 == 1 {
        return Err(GeocodioError::OddCoordinateCount(latlngs.len()));
    }

    Ok(latlngs
        .chunks_exact(2)
        .map(|pair| format_pair(pair[0], pair[1]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_FIELDS: &[&str] = &[];

    fn param<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
        params.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn forward_trims_address() {
        let params = forward("  42370 Bob Hope Dr, Rancho Mirage, CA \n", NO_FIELDS).unwrap();
        assert_eq!(param(&params, "q"), Some("42370 Bob Hope Dr, Rancho Mirage, CA"));
        assert_eq!(param(&params, "fields"), None);
    }

    #[test]
    fn forward_rejects_blank_address() {
        assert!(matches!(forward("", NO_FIELDS), Err(GeocodioError::EmptyAddress)));
        assert!(matches!(forward(" \t ", NO_FIELDS), Err(GeocodioError::EmptyAddress)));
    }

    #[test]
    fn reverse_formats_nine_decimals() {
        let params = reverse(38.9002898, -76.9990361, NO_FIELDS).unwrap();
        assert_eq!(param(&params, "q"), Some("38.900289800,-76.999036100"));
    }

    #[test]
    fn reverse_rejects_origin() {
        assert!(matches!(
            reverse(0.0, 0.0, &[field::TIMEZONE]),
            Err(GeocodioError::MissingCoordinates)
        ));
    }

    #[test]
    fn reverse_accepts_points_on_one_axis() {
        assert_eq!(
            param(&reverse(0.0, 12.5, NO_FIELDS).unwrap(), "q"),
            Some("0.000000000,12.500000000")
        );
        assert!(reverse(-33.0, 0.0, NO_FIELDS).is_ok());
    }

    #[test]
    fn fields_are_joined_in_order_and_passed_verbatim() {
        let params = forward("Main St", &["timezone", "cd", "acs-economics"]).unwrap();
        assert_eq!(param(&params, "fields"), Some("timezone,cd,acs-economics"));
    }

    #[test]
    fn empty_fields_list_is_omitted() {
        assert_eq!(fields_param(NO_FIELDS), None);
        let params = reverse(1.0, 2.0, NO_FIELDS).unwrap();
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn batch_forward_keeps_order() {
        let body = batch_forward(&["a", "b", "c"]).unwrap();
        assert_eq!(body, vec!["a", "b", "c"]);
        assert!(matches!(batch_forward(NO_FIELDS), Err(GeocodioError::EmptyBatch)));
    }

    #[test]
    fn batch_reverse_pairs_in_input_order() {
        let body = batch_reverse_flat(&[1.0, 2.0, 3.5, -4.25, 5.0, 6.0]).unwrap();
        assert_eq!(
            body,
            vec![
                "1.000000000,2.000000000",
                "3.500000000,-4.250000000",
                "5.000000000,6.000000000",
            ]
        );
    }

    #[test]
    fn batch_reverse_rejects_empty_and_odd_input() {
        assert!(matches!(batch_reverse_flat(&[]), Err(GeocodioError::EmptyBatch)));
        assert!(matches!(
            batch_reverse_flat(&[1.0]),
            Err(GeocodioError::OddCoordinateCount(1))
        ));
        assert!(matches!(
            batch_reverse_flat(&[1.0, 2.0, 3.0]),
            Err(GeocodioError::OddCoordinateCount(3))
        ));
    }

    #[test]
    fn typed_batch_reverse_matches_flat_form() {
        let typed = batch_reverse(&[Coordinates::new(1.0, 2.0), Coordinates::new(3.0, 4.0)]).unwrap();
        let flat = batch_reverse_flat(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(typed, flat);
        assert!(matches!(batch_reverse(&[]), Err(GeocodioError::EmptyBatch)));
    }

    #[test]
    fn nine_decimal_format_round_trips() {
        for value in [33.738987, -116.40787, 0.000000001, 89.999999999, -179.123456789] {
            let parsed: f64 = format_coordinate(value).parse().unwrap();
            assert!((parsed - value).abs() < 1e-9, "{value} -> {parsed}");
        }
    }
}

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees.
///
/// On the wire this is the `location` object: `{"lat": .., "lng": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// `(0.0, 0.0)` stands for "not set" in reverse lookups.
    pub fn is_unset(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.9},{:.9}", self.latitude, self.longitude)
    }
}

/// Parsed pieces of an address, as echoed or matched by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressComponents {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predirectional: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postdirectional: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondaryunit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondarynumber: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// The query as the service understood it. Only forward lookups echo one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Input {
    #[serde(default)]
    pub address_components: AddressComponents,
    #[serde(default)]
    pub formatted_address: String,
}

/// One candidate match.
///
/// `formatted_address`, `location` and `accuracy` are required; a result
/// missing any of them fails to decode instead of turning into zeros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub address_components: AddressComponents,
    pub formatted_address: String,
    pub location: Coordinates,
    pub accuracy: f64,
    #[serde(default)]
    pub accuracy_type: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub fields: Fields,
}

/// Optional annotations requested through the `fields` parameter.
///
/// Each slot is present only when the service sent it. Congressional
/// districts come in two shapes depending on how the service answered (a
/// single `congressional_district` object, or a `congressional_districts`
/// list when a point straddles districts); both are kept as received. Use
/// [`Fields::district`] for "the" district.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<Timezone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip4: Option<Zip4>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub congressional_district: Option<CongressionalDistrict>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub congressional_districts: Vec<CongressionalDistrict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_legislative_districts: Option<StateLegislativeDistricts>,
}

impl Fields {
    /// Resolves the congressional district from whichever slot is filled.
    ///
    /// The single object wins when its name is non-empty; otherwise the first
    /// list entry; otherwise `None`.
    pub fn district(&self) -> Option<&CongressionalDistrict> {
        self.congressional_district
            .as_ref()
            .filter(|cd| !cd.name.is_empty())
            .or_else(|| self.congressional_districts.first())
    }

    pub fn is_empty(&self) -> bool {
        self.timezone.is_none()
            && self.zip4.is_none()
            && self.congressional_district.is_none()
            && self.congressional_districts.is_empty()
            && self.state_legislative_districts.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timezone {
    pub name: String,
    /// Hours from UTC; some zones are offset by a half hour.
    pub utc_offset: f64,
    pub observes_dst: bool,
    pub abbreviation: String,
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Zip4 {
    /// Four-digit add-on codes covering the address.
    pub plus4: Vec<String>,
    pub zip9: Vec<String>,
    pub building_or_firm_name: Option<String>,
    pub government_building: Option<String>,
    pub city_delivery: bool,
    pub valid_delivery_area: bool,
    pub exact_match: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CongressionalDistrict {
    pub name: String,
    pub district_number: u32,
    pub congress_number: String,
    pub congress_years: String,
    pub proportion: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateLegislativeDistricts {
    pub house: StateLegislativeDistrict,
    pub senate: StateLegislativeDistrict,
}

/// District numbers are strings: some states use values like "2A".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateLegislativeDistrict {
    pub name: String,
    pub district_number: String,
}

/// Response to a single forward or reverse lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Input>,
    #[serde(default)]
    pub results: Vec<Candidate>,
    /// Set on a batch entry the service could not answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    raw: String,
}

impl GeocodeResult {
    pub(crate) fn with_raw(mut self, raw: String) -> Self {
        self.raw = raw;
        self
    }

    /// The best-ranked candidate.
    pub fn first(&self) -> Option<&Candidate> {
        self.results.first()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// The response body exactly as the service returned it.
    ///
    /// Empty for results nested inside a [`BatchResponse`]; use the batch's
    /// own accessor there.
    pub fn response_as_str(&self) -> &str {
        &self.raw
    }
}

/// The query a batch entry answers, as it was submitted.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchQuery {
    Address(String),
    Coordinates(Coordinates),
}

impl std::fmt::Display for BatchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchQuery::Address(address) => f.write_str(address),
            BatchQuery::Coordinates(coords) => coords.fmt(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    pub query: BatchQuery,
    /// The query string the service echoed back.
    pub echoed_query: String,
    pub response: GeocodeResult,
}

/// Response to a batch lookup; entries follow submission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResponse {
    pub results: Vec<BatchEntry>,
    raw: String,
}

impl BatchResponse {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BatchEntry> {
        self.results.iter()
    }

    /// The response body exactly as the service returned it.
    pub fn response_as_str(&self) -> &str {
        &self.raw
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireBatchResponse {
    pub results: Vec<WireBatchEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireBatchEntry {
    pub query: String,
    pub response: GeocodeResult,
}

impl WireBatchResponse {
    /// Tags each entry with the query submitted at the same position.
    pub(crate) fn into_response(
        self,
        submitted: Vec<BatchQuery>,
        raw: String,
    ) -> Result<BatchResponse, crate::GeocodioError> {
        if self.results.len() != submitted.len() {
            return Err(crate::GeocodioError::DecodeFailure(format!(
                "batch response has {} entries for {} queries",
                self.results.len(),
                submitted.len()
            )));
        }

        let results = self
            .results
            .into_iter()
            .zip(submitted)
            .map(|(entry, query)| BatchEntry {
                query,
                echoed_query: entry.query,
                response: entry.response,
            })
            .collect();

        Ok(BatchResponse { results, raw })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE: &str = r#"{
        "input": {
            "address_components": {"number": "42370", "street": "Bob Hope", "suffix": "Dr", "city": "Rancho Mirage", "state": "CA", "country": "US"},
            "formatted_address": "42370 Bob Hope Dr, Rancho Mirage, CA"
        },
        "results": [{
            "address_components": {"number": "42370", "street": "Bob Hope", "suffix": "Dr", "city": "Rancho Mirage", "county": "Riverside County", "state": "CA", "zip": "92270", "country": "US"},
            "formatted_address": "42370 Bob Hope Dr, Rancho Mirage, CA 92270",
            "location": {"lat": 33.738987, "lng": -116.40787},
            "accuracy": 1,
            "accuracy_type": "rooftop",
            "source": "Riverside"
        }]
    }"#;

    #[test]
    fn decodes_single_result_without_fields() {
        let parsed: GeocodeResult = serde_json::from_str(SINGLE).unwrap();

        assert_eq!(parsed.results.len(), 1);
        let first = parsed.first().unwrap();
        assert_eq!(first.location, Coordinates::new(33.738987, -116.40787));
        assert_eq!(first.accuracy, 1.0);
        assert_eq!(first.address_components.zip.as_deref(), Some("92270"));
        assert!(first.fields.is_empty());
        assert_eq!(
            parsed.input.unwrap().formatted_address,
            "42370 Bob Hope Dr, Rancho Mirage, CA"
        );
    }

    #[test]
    fn reverse_response_has_no_input() {
        let json = r#"{"results": [{"formatted_address": "1109 N Highland St, Arlington, VA 22201",
            "location": {"lat": 38.886665, "lng": -77.094733}, "accuracy": 1}]}"#;
        let parsed: GeocodeResult = serde_json::from_str(json).unwrap();

        assert!(parsed.input.is_none());
        assert_eq!(parsed.results[0].address_components, AddressComponents::default());
    }

    #[test]
    fn result_without_location_fails_to_decode() {
        let json = r#"{"results": [{"formatted_address": "Somewhere", "accuracy": 1}]}"#;
        assert!(serde_json::from_str::<GeocodeResult>(json).is_err());
    }

    #[test]
    fn decodes_all_optional_fields() {
        let json = r#"{
            "timezone": {"name": "America/Los_Angeles", "utc_offset": -8, "observes_dst": true, "abbreviation": "PST"},
            "zip4": {"plus4": ["2515"], "zip9": ["92270-2515"], "city_delivery": true, "exact_match": true},
            "congressional_districts": [{"name": "Congressional District 36", "district_number": 36, "congress_number": "118th", "proportion": 1}],
            "state_legislative_districts": {
                "house": {"name": "Assembly District 47", "district_number": "47"},
                "senate": {"name": "State Senate District 19", "district_number": "19"}
            }
        }"#;
        let fields: Fields = serde_json::from_str(json).unwrap();

        let tz = fields.timezone.as_ref().unwrap();
        assert_eq!(tz.name, "America/Los_Angeles");
        assert_eq!(tz.utc_offset, -8.0);
        assert!(tz.observes_dst);
        assert_eq!(fields.zip4.as_ref().unwrap().plus4, vec!["2515"]);
        assert_eq!(fields.district().unwrap().district_number, 36);
        let stateleg = fields.state_legislative_districts.as_ref().unwrap();
        assert_eq!(stateleg.house.district_number, "47");
        assert_eq!(stateleg.senate.district_number, "19");
    }

    #[test]
    fn district_accessor_prefers_named_single_object() {
        let fields = Fields {
            congressional_district: Some(CongressionalDistrict {
                name: "Congressional District 8".into(),
                district_number: 8,
                ..Default::default()
            }),
            congressional_districts: vec![CongressionalDistrict {
                name: "Congressional District 9".into(),
                district_number: 9,
                ..Default::default()
            }],
            ..Default::default()
        };

        assert_eq!(fields.district().unwrap().district_number, 8);
    }

    #[test]
    fn district_accessor_falls_back_to_list_when_single_is_empty() {
        let json = r#"{"congressional_district": {},
            "congressional_districts": [{"name": "Congressional District 8", "district_number": 8}]}"#;
        let fields: Fields = serde_json::from_str(json).unwrap();

        assert!(fields.congressional_district.is_some());
        assert_eq!(fields.congressional_districts.len(), 1);
        assert_eq!(fields.district().unwrap().district_number, 8);
    }

    #[test]
    fn district_accessor_is_none_without_districts() {
        assert!(Fields::default().district().is_none());

        let only_empty = Fields {
            congressional_district: Some(CongressionalDistrict::default()),
            ..Default::default()
        };
        assert!(only_empty.district().is_none());
    }

    #[test]
    fn batch_entries_are_tagged_in_submission_order() {
        let json = format!(
            r#"{{"results": [{{"query": "a", "response": {SINGLE}}}, {{"query": "b", "response": {{"results": []}}}}]}}"#
        );
        let wire: WireBatchResponse = serde_json::from_str(&json).unwrap();
        let submitted = vec![
            BatchQuery::Address("a".into()),
            BatchQuery::Address("b".into()),
        ];

        let batch = wire.into_response(submitted, json.clone()).unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.results[0].query, BatchQuery::Address("a".into()));
        assert_eq!(batch.results[1].echoed_query, "b");
        assert!(batch.results[1].response.is_empty());
        assert_eq!(batch.response_as_str(), json);
    }

    #[test]
    fn batch_entry_count_mismatch_is_a_decode_failure() {
        let wire: WireBatchResponse = serde_json::from_str(r#"{"results": []}"#).unwrap();
        let err = wire
            .into_response(vec![BatchQuery::Address("a".into())], String::new())
            .unwrap_err();

        assert!(matches!(err, crate::GeocodioError::DecodeFailure(_)));
    }

    #[test]
    fn coordinates_display_uses_nine_decimals() {
        let coords = Coordinates::new(38.9002898, -76.9990361);
        assert_eq!(coords.to_string(), "38.900289800,-76.999036100");
    }
}

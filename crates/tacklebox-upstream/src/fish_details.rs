//! Reshaping of Fishial species records into the client-facing details payload.
//!
//! Fishial species entries carry a loosely typed `fishangler-data` object.
//! Fields are copied through as-is when present and replaced by `"Unknown"`
//! when absent; weights, dates and colors get converted for display.

use chrono::DateTime;
use serde::Serialize;
use serde_json::Value;

const UNKNOWN: &str = "Unknown";
const LBS_PER_GRAM: f64 = 0.002_204_62;

/// Species details returned to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FishDetails {
    /// Common display name.
    pub name: Value,
    /// Latin name.
    pub scientific_name: Value,
    /// Other names the species is known by.
    pub common_names: Value,
    /// Taxonomic ranks.
    pub taxonomy: Taxonomy,
    /// Coloring.
    pub color: Coloring,
    /// Size, weight and lifespan.
    pub size_and_lifespan: SizeAndLifespan,
    /// Where the species lives.
    pub habitat_and_range: HabitatAndRange,
    /// Diet and edibility.
    pub feeding_and_food_value: FeedingAndFoodValue,
    /// Free-form description.
    pub appearance_and_anatomy: Value,
    /// Handling advice and conservation status.
    pub handling_and_conservation: HandlingAndConservation,
    /// The IGFA weight record for the species.
    pub record_catch: RecordCatch,
    /// Reference photo.
    pub image_url: Value,
}

/// Taxonomic ranks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct Taxonomy {
    pub family: Value,
    pub genus: Value,
    #[serde(rename = "class")]
    pub class_name: Value,
    pub order: Value,
    pub kingdom: Value,
    pub phylum: Value,
}

/// Coloring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coloring {
    /// Dominant photo color as `#RRGGBB`.
    pub dominant_color: String,
    /// Textual coloration description.
    pub coloration: Value,
}

/// Size, weight and lifespan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct SizeAndLifespan {
    pub common_length: Value,
    pub maximum_length: Value,
    pub weight_record: String,
    pub lifespan: Value,
    pub reproduction: Value,
}

/// Where the species lives.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct HabitatAndRange {
    pub habitat: Value,
    pub depth_range: String,
    pub distribution: Value,
}

/// Diet and edibility.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct FeedingAndFoodValue {
    pub diet: Value,
    pub food_value: Value,
    pub health_warnings: Value,
}

/// Handling advice and conservation status.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct HandlingAndConservation {
    pub handling_tip: Value,
    pub conservation_status: Value,
}

/// The IGFA weight record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct RecordCatch {
    pub angler: Value,
    pub location: Value,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub weight: String,
    pub date: String,
}

/// Build the details payload from a Fishial species entry.
#[must_use]
pub fn extract_fish_details(species: &Value) -> FishDetails {
    let empty = Value::Null;
    let data = species.get("fishangler-data").unwrap_or(&empty);
    let photo = data.get("photo").unwrap_or(&empty);
    let record = data
        .get("igfaWeightRecord")
        .and_then(|r| r.get("record"))
        .unwrap_or(&empty);
    let weight = format_weight(record.get("weight"));

    FishDetails {
        name: field(data, "title"),
        scientific_name: field(data, "scientificName"),
        common_names: field_or(data, "commonNames", ""),
        taxonomy: Taxonomy {
            family: field(data, "family"),
            genus: field(data, "genus"),
            class_name: field(data, "class"),
            order: field(data, "order"),
            kingdom: field(data, "kingdom"),
            phylum: field(data, "phylum"),
        },
        color: Coloring {
            dominant_color: rgb_to_hex(photo.get("dominantColor")),
            coloration: field(data, "coloration"),
        },
        size_and_lifespan: SizeAndLifespan {
            common_length: field(data, "commonLength"),
            maximum_length: field(data, "length"),
            weight_record: weight.clone(),
            lifespan: field(data, "longevityWild"),
            reproduction: field(data, "reproduction"),
        },
        habitat_and_range: HabitatAndRange {
            habitat: field(data, "environmentDetail"),
            depth_range: format!(
                "{}-{} ft",
                display(data.get("depthRangeShallow")),
                display(data.get("depthRangeDeep"))
            ),
            distribution: field(data, "distribution"),
        },
        feeding_and_food_value: FeedingAndFoodValue {
            diet: field(data, "feedingBehavior"),
            food_value: field(data, "foodValue"),
            health_warnings: field(data, "healthWarnings"),
        },
        appearance_and_anatomy: field(data, "description"),
        handling_and_conservation: HandlingAndConservation {
            handling_tip: field(data, "handlingInstructions"),
            conservation_status: field(data, "conservation"),
        },
        record_catch: RecordCatch {
            angler: field(record, "anglerName"),
            location: field(record, "place"),
            kind: "IGFA Weight Record",
            weight,
            date: format_date(record.get("dateTime")),
        },
        image_url: field(photo, "mediaUri"),
    }
}

fn field(obj: &Value, key: &str) -> Value {
    field_or(obj, key, UNKNOWN)
}

fn field_or(obj: &Value, key: &str, default: &str) -> Value {
    obj.as_object()
        .and_then(|map| map.get(key))
        .cloned()
        .unwrap_or_else(|| Value::String(default.to_string()))
}

/// Render a scalar for inline text.
fn display(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => UNKNOWN.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Format grams as `"<lb> lb <oz> oz (<grams> g)"`.
fn format_weight(grams: Option<&Value>) -> String {
    let amount = match grams {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s != UNKNOWN => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match amount {
        Some(g) if g > 0.0 => {
            let lbs = g * LBS_PER_GRAM;
            let whole = lbs.trunc();
            let oz = ((lbs - whole) * 16.0).trunc();
            format!("{whole} lb {oz} oz ({} g)", display(grams))
        }
        _ => UNKNOWN.to_string(),
    }
}

/// Format a unix timestamp (seconds) as `"Mon DD, YYYY"` in UTC.
fn format_date(timestamp: Option<&Value>) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let seconds = match timestamp {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        _ => None,
    };

    seconds
        .filter(|s| *s != 0)
        .and_then(|s| DateTime::from_timestamp(s, 0))
        .map_or_else(
            || UNKNOWN.to_string(),
            |dt| dt.format("%b %d, %Y").to_string(),
        )
}

/// Convert `{"r":..,"g":..,"b":..}` to `#RRGGBB`.
fn rgb_to_hex(color: Option<&Value>) -> String {
    let Some(Value::Object(map)) = color else {
        return UNKNOWN.to_string();
    };

    let channel = |key: &str| -> u8 {
        map.get(key)
            .and_then(Value::as_u64)
            .map_or(0, |v| u8::try_from(v.min(255)).unwrap_or(u8::MAX))
    };

    format!("#{:02X}{:02X}{:02X}", channel("r"), channel("g"), channel("b"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn largemouth() -> Value {
        json!({
            "fishangler-data": {
                "title": "Largemouth Bass",
                "scientificName": "Micropterus salmoides",
                "commonNames": ["Bucketmouth", "Green bass"],
                "family": "Centrarchidae",
                "genus": "Micropterus",
                "class": "Actinopterygii",
                "order": "Perciformes",
                "kingdom": "Animalia",
                "phylum": "Chordata",
                "coloration": "Olive green with dark lateral stripe",
                "commonLength": 40,
                "length": 97,
                "longevityWild": "16 years",
                "environmentDetail": "Lakes and ponds",
                "depthRangeShallow": 3,
                "depthRangeDeep": 20,
                "distribution": "North America",
                "feedingBehavior": "Carnivore",
                "foodValue": "Good",
                "description": "Large mouth extending past the eye",
                "photo": {
                    "mediaUri": "https://cdn.example.com/bass.jpg",
                    "dominantColor": { "r": 85, "g": 107, "b": 47, "a": 1 }
                },
                "igfaWeightRecord": {
                    "record": {
                        "weight": 10090,
                        "anglerName": "George Perry",
                        "place": "Montgomery Lake, Georgia",
                        "dateTime": -1186012800
                    }
                }
            }
        })
    }

    #[test]
    fn extracts_full_record() {
        let details = extract_fish_details(&largemouth());

        assert_eq!(details.name, json!("Largemouth Bass"));
        assert_eq!(details.taxonomy.class_name, json!("Actinopterygii"));
        assert_eq!(details.color.dominant_color, "#556B2F");
        assert_eq!(details.habitat_and_range.depth_range, "3-20 ft");
        assert_eq!(details.size_and_lifespan.common_length, json!(40));
        assert_eq!(details.record_catch.angler, json!("George Perry"));
        assert_eq!(details.record_catch.date, "Jun 02, 1932");
        assert_eq!(details.image_url, json!("https://cdn.example.com/bass.jpg"));
    }

    #[test]
    fn converts_weight_to_pounds_and_ounces() {
        let details = extract_fish_details(&largemouth());
        // 10090 g = 22.244... lb = 22 lb 3 oz
        assert_eq!(details.record_catch.weight, "22 lb 3 oz (10090 g)");
        assert_eq!(details.size_and_lifespan.weight_record, details.record_catch.weight);
    }

    #[test]
    fn numeric_string_weight_is_converted() {
        assert_eq!(format_weight(Some(&json!("1000"))), "2 lb 3 oz (1000 g)");
    }

    #[test]
    fn missing_fields_become_unknown() {
        let details = extract_fish_details(&json!({ "fishangler-data": {} }));

        assert_eq!(details.name, json!("Unknown"));
        assert_eq!(details.common_names, json!(""));
        assert_eq!(details.color.dominant_color, "Unknown");
        assert_eq!(details.habitat_and_range.depth_range, "Unknown-Unknown ft");
        assert_eq!(details.record_catch.weight, "Unknown");
        assert_eq!(details.record_catch.date, "Unknown");
        assert_eq!(details.record_catch.kind, "IGFA Weight Record");
    }

    #[test]
    fn missing_species_data_is_tolerated() {
        let details = extract_fish_details(&json!({}));
        assert_eq!(details.scientific_name, json!("Unknown"));
        assert_eq!(details.image_url, json!("Unknown"));
    }

    #[test]
    fn zero_and_unknown_weights() {
        assert_eq!(format_weight(Some(&json!(0))), "Unknown");
        assert_eq!(format_weight(Some(&json!("Unknown"))), "Unknown");
        assert_eq!(format_weight(None), "Unknown");
    }

    #[test]
    fn color_channels_default_to_zero() {
        assert_eq!(rgb_to_hex(Some(&json!({ "r": 255 }))), "#FF0000");
    }

    #[test]
    fn serializes_with_wire_names() {
        let json = serde_json::to_value(extract_fish_details(&largemouth())).unwrap();
        assert_eq!(json["taxonomy"]["class"], "Actinopterygii");
        assert_eq!(json["record_catch"]["type"], "IGFA Weight Record");
        assert_eq!(json["color"]["coloration"], "Olive green with dark lateral stripe");
    }
}

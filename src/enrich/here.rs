// src/enrich/here.rs
//! HERE reverse-geocoding response (only the fields we read, all optional).

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReverseGeocode {
    #[serde(default)]
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Item {
    #[serde(alias = "Address")]
    pub address: Address,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub country_name: String,
    pub city: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_first_item_address() {
        let body = r#"{
            "items": [{
                "title": "Via Marina, Positano",
                "id": "here:af:street:1",
                "resultType": "street",
                "address": {
                    "label": "Via Marina, 84017 Positano SA, Italia",
                    "countryCode": "ITA",
                    "countryName": "Italy",
                    "city": "Positano"
                },
                "position": {"lat": 40.62807, "lng": 14.37538},
                "distance": 12
            }]
        }"#;
        let res: ReverseGeocode = serde_json::from_str(body).unwrap();
        assert_eq!(res.items.len(), 1);
        assert_eq!(res.items[0].address.country_name, "Italy");
        assert_eq!(res.items[0].address.city, "Positano");
    }

    #[test]
    fn item_without_city_decodes_to_empty() {
        let body = r#"{"items":[{"Address":{"countryName":"Italy"}}]}"#;
        let res: ReverseGeocode = serde_json::from_str(body).unwrap();
        assert_eq!(res.items[0].address.country_name, "Italy");
        assert_eq!(res.items[0].address.city, "");
    }

    #[test]
    fn empty_body_has_no_items() {
        let res: ReverseGeocode = serde_json::from_str("{}").unwrap();
        assert!(res.items.is_empty());
    }
}

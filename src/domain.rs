use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Producer {
    pub id: u32,
    #[serde(rename = "nome_produttore")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Product {
    pub id: u32,
    #[serde(rename = "nome_prodotto")]
    pub name: String,
    #[serde(rename = "immagine", default)]
    pub image: Option<String>,
    #[serde(rename = "rel_produttore", default)]
    pub producer: Option<Producer>,
}

/// A lot as listed by `/api/lotti`. The `get_*` fields are computed by the
/// backend and are never recomputed here.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Lot {
    pub id: u32,
    #[serde(rename = "rel_prodotto")]
    pub product: Product,
    #[serde(rename = "data_consegna")]
    pub delivery_date: NaiveDate,
    #[serde(rename = "get_date")]
    pub delivery_date_label: String,
    #[serde(rename = "qta_lotto")]
    pub total_quantity: u32,
    #[serde(rename = "get_qta_disponibile")]
    pub available_quantity: i64,
    #[serde(rename = "qta_unita_misura")]
    pub unit_of_measure: String,
    #[serde(rename = "prezzo_unitario")]
    pub unit_price: f64,
    #[serde(rename = "get_prezzo_str")]
    pub price_label: String,
    #[serde(rename = "sospeso", default, deserialize_with = "null_as_false")]
    pub suspended: bool,
}

/// The lot embedded in a reservation. Only the fields the reservation
/// card needs are read.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReservedLot {
    pub id: u32,
    #[serde(rename = "rel_prodotto")]
    pub product: Product,
    #[serde(rename = "data_consegna")]
    pub delivery_date: NaiveDate,
    #[serde(rename = "qta_unita_misura")]
    pub unit_of_measure: String,
    #[serde(rename = "prezzo_unitario")]
    pub unit_price: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Reservation {
    pub id: u32,
    #[serde(rename = "qta")]
    pub quantity: u32,
    #[serde(rename = "rel_lotto")]
    pub lot: ReservedLot,
}

impl Reservation {
    pub fn subtotal(&self) -> f64 {
        f64::from(self.quantity) * self.lot.unit_price
    }
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}
